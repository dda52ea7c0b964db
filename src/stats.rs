/// Time-weighted and count-based statistics.
///
/// Queue-length and busy-time integrals use the rectangle rule over the
/// state held *before* the events at the end of each interval are applied.
/// Counters are bumped on every completion. Ratios are derived on demand.

use crate::flow::{transmission_time, PACKET_SIZE_BITS};
use crate::queue::Packet;
use crate::time::SimTime;

// ── FlowStats ─────────────────────────────────────────────────────────

/// Accumulators for one flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStats {
    /// Packets fully transmitted.
    pub packets_served: u64,
    /// Sum of arrival-to-departure times of served packets.
    pub total_sojourn_time: f64,
    /// Sum of service times of served packets.
    pub total_service_time: f64,
    /// Integral of queue length over time (packet-seconds).
    pub queue_area: f64,
    /// Link time spent transmitting this flow's packets.
    pub busy_time: f64,
}

impl FlowStats {
    /// Mean sojourn time per served packet. This includes the packet's
    /// own transmission, not only the wait before it.
    pub fn mean_sojourn_time(&self) -> Option<f64> {
        self.per_packet(self.total_sojourn_time)
    }

    pub fn mean_service_time(&self) -> Option<f64> {
        self.per_packet(self.total_service_time)
    }

    /// Time-averaged queue length over `elapsed` seconds.
    pub fn mean_queue_length(&self, elapsed: f64) -> f64 {
        ratio(self.queue_area, elapsed)
    }

    /// Share of `elapsed` the link spent on this flow.
    pub fn utilization(&self, elapsed: f64) -> f64 {
        ratio(self.busy_time, elapsed)
    }

    /// Packets served per second over `elapsed`.
    pub fn packet_throughput(&self, elapsed: f64) -> f64 {
        ratio(self.packets_served as f64, elapsed)
    }

    /// Achieved bit rate over `elapsed`.
    pub fn throughput_bps(&self, elapsed: f64) -> f64 {
        self.packet_throughput(elapsed) * PACKET_SIZE_BITS
    }

    fn per_packet(&self, total: f64) -> Option<f64> {
        if self.packets_served == 0 {
            None
        } else {
            Some(total / self.packets_served as f64)
        }
    }
}

fn ratio(value: f64, elapsed: f64) -> f64 {
    if elapsed > 0.0 {
        value / elapsed
    } else {
        0.0
    }
}

// ── StatisticsCollector ──────────────────────────────────────────────

/// Per-flow accumulators plus the system busy-time integral.
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    flows: Vec<FlowStats>,
    total_busy_time: f64,
    last_update: SimTime,
}

impl StatisticsCollector {
    pub fn new(flows: usize) -> Self {
        StatisticsCollector {
            flows: vec![FlowStats::default(); flows],
            total_busy_time: 0.0,
            last_update: SimTime::ZERO,
        }
    }

    /// Integrate queue lengths and server occupancy from the last update
    /// up to `now`. Does nothing for an empty or negative interval.
    pub fn advance<I>(&mut self, now: SimTime, queue_sizes: I, server_busy: bool)
    where
        I: IntoIterator<Item = usize>,
    {
        let interval = match now.duration_since(self.last_update) {
            Some(d) if d > 0.0 => d,
            _ => return,
        };

        for (stats, size) in self.flows.iter_mut().zip(queue_sizes) {
            stats.queue_area += size as f64 * interval;
        }
        if server_busy {
            self.total_busy_time += interval;
        }
        self.last_update = now;
    }

    /// Account for `packet` of `flow` leaving the system at `now`.
    pub fn record_completion(&mut self, flow: usize, now: SimTime, packet: &Packet) {
        let stats = &mut self.flows[flow];
        stats.total_sojourn_time += now.as_secs() - packet.arrival_time.as_secs();
        stats.total_service_time += packet.service_time;
        stats.busy_time += transmission_time();
        stats.packets_served += 1;
    }

    pub fn flow(&self, flow: usize) -> &FlowStats {
        &self.flows[flow]
    }

    pub fn flows(&self) -> &[FlowStats] {
        &self.flows
    }

    /// Time the server was busy, integrated over statistics intervals.
    pub fn total_busy_time(&self) -> f64 {
        self.total_busy_time
    }
}

// ── Fairness ──────────────────────────────────────────────────────────

/// Jain's fairness index `(Σx)² / (n·Σx²)`.
///
/// Returns 1.0 when every value is zero or the slice is empty.
pub fn jain_fairness_index(throughputs: &[f64]) -> f64 {
    let sum: f64 = throughputs.iter().sum();
    let sum_sq: f64 = throughputs.iter().map(|x| x * x).sum();
    let denominator = throughputs.len() as f64 * sum_sq;
    if denominator > 0.0 {
        sum * sum / denominator
    } else {
        1.0
    }
}
