/// Simulation execution loop.
///
/// Owns simulated time and every piece of runtime state: flow
/// generators, queues, deficit counters, the server and the statistics.
/// The loop is purely synchronous and single-threaded. The only source of
/// nondeterminism is the injected RNG, so a fixed seed reproduces a run
/// exactly.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::drr::DeficitRoundRobin;
use crate::error::{SimError, SimResult};
use crate::event::EventKind;
use crate::flow::{FlowModel, FlowSpec, LINK_SPEED_BPS, PACKET_SIZE_BITS};
use crate::queue::{Packet, QueueBank};
use crate::scheduler::EventQueue;
use crate::stats::{jain_fairness_index, FlowStats, StatisticsCollector};
use crate::time::SimTime;

// ── Server ────────────────────────────────────────────────────────────

/// State of the single output link.
#[derive(Debug, Clone, Copy)]
struct Server {
    /// Flow whose head packet is on the wire.
    serving: Option<usize>,
    /// When that transmission ends; `NEVER` while idle.
    completes_at: SimTime,
}

impl Server {
    fn idle() -> Self {
        Server {
            serving: None,
            completes_at: SimTime::NEVER,
        }
    }
}

// ── Simulator ─────────────────────────────────────────────────────────

/// A DRR-scheduled link fed by independent flows.
///
/// Build with `new` (injected RNG) or `seeded`, then call
/// `run_simulation` one or more times with increasing horizons. All
/// queries are read-only and valid at any time.
#[derive(Debug, Clone)]
pub struct Simulator<R = StdRng> {
    flows: Vec<FlowModel>,
    queues: QueueBank,
    drr: DeficitRoundRobin,
    stats: StatisticsCollector,
    events: EventQueue,
    rng: R,
    now: SimTime,
    next_arrivals: Vec<SimTime>,
    server: Server,
    events_processed: u64,
}

impl Simulator<StdRng> {
    /// Create a simulator driven by a `StdRng` seeded with `seed`.
    pub fn seeded(flows: Vec<FlowSpec>, quantum: f64, seed: u64) -> SimResult<Self> {
        Simulator::new(flows, quantum, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> Simulator<R> {
    /// Validate the configuration and schedule the first arrival of every
    /// flow. Fails with `InvalidConfiguration` on an empty flow list, a
    /// non-positive quantum or a non-positive flow rate.
    pub fn new(flows: Vec<FlowSpec>, quantum: f64, mut rng: R) -> SimResult<Self> {
        if flows.is_empty() {
            return Err(SimError::InvalidConfiguration("flow list is empty".into()));
        }
        let drr = DeficitRoundRobin::new(flows.len(), quantum)?;
        let models = flows
            .into_iter()
            .map(FlowModel::new)
            .collect::<SimResult<Vec<_>>>()?;

        let n = models.len();
        let mut events = EventQueue::new();
        let mut next_arrivals = Vec::with_capacity(n);
        for (flow, model) in models.iter().enumerate() {
            let at = SimTime::ZERO.plus(model.generate_interarrival_time(&mut rng));
            events.schedule(at, EventKind::Arrival { flow });
            next_arrivals.push(at);
            debug!(flow, spec = %model.spec(), first_arrival = at.as_secs(), "flow registered");
        }

        debug!(flows = n, quantum, "simulator constructed");

        Ok(Simulator {
            flows: models,
            queues: QueueBank::new(n),
            drr,
            stats: StatisticsCollector::new(n),
            events,
            rng,
            now: SimTime::ZERO,
            next_arrivals,
            server: Server::idle(),
            events_processed: 0,
        })
    }

    // ── Execution ─────────────────────────────────────────────

    /// Process every event up to and including `max_time` seconds.
    ///
    /// May be called again with a later horizon to continue the same run.
    /// Returns the number of events processed during this call.
    pub fn run_simulation(&mut self, max_time: f64) -> u64 {
        let horizon = SimTime::from_secs(max_time);
        let start = self.events_processed;
        debug!(from = self.now.as_secs(), to = max_time, "run started");

        while self.now < horizon {
            self.flush_stats();
            match self.events.peek_time() {
                Some(next) if next <= horizon => self.process_tick(),
                _ => break,
            }
        }
        self.flush_stats();

        let processed = self.events_processed - start;
        debug!(
            now = self.now.as_secs(),
            processed,
            backlog = self.queues.total_backlog(),
            "run finished"
        );
        processed
    }

    /// Advance to the next event timestamp regardless of any horizon and
    /// process every event due at it.
    ///
    /// Statistics are integrated up to the previous timestamp first, as in
    /// `run_simulation`. Returns the new simulated time.
    pub fn step(&mut self) -> Option<SimTime> {
        self.flush_stats();
        if self.events.is_empty() {
            return None;
        }
        self.process_tick();
        Some(self.now)
    }

    fn flush_stats(&mut self) {
        self.stats
            .advance(self.now, self.queues.sizes(), self.server.serving.is_some());
    }

    /// Move the clock to the earliest pending event and apply everything
    /// due at that instant: arrivals by ascending flow, then the completion.
    fn process_tick(&mut self) {
        let Some(next) = self.events.peek_time() else {
            return;
        };
        debug_assert!(next >= self.now, "time went backward: {} -> {}", self.now, next);
        self.now = next;

        while let Some(event) = self.events.pop_due(self.now) {
            self.events_processed += 1;
            match event.kind {
                EventKind::Arrival { flow } => self.process_arrival(flow),
                EventKind::Completion { flow } => self.process_completion(flow),
            }
        }
    }

    fn process_arrival(&mut self, flow: usize) {
        let was_empty = self.queues.is_empty(flow);
        let packet = Packet {
            arrival_time: self.now,
            service_time: self.flows[flow].generate_service_time(),
        };
        self.queues.push(flow, packet);

        let gap = self.flows[flow].generate_interarrival_time(&mut self.rng);
        let next = self.now.plus(gap);
        self.next_arrivals[flow] = next;
        self.events.schedule(next, EventKind::Arrival { flow });
        trace!(flow, now = self.now.as_secs(), queued = self.queues.size(flow), "arrival");

        // Only an idle link can pick up new work; a busy one re-runs the
        // pass when its transmission completes.
        if was_empty && self.server.serving.is_none() {
            self.dispatch();
        }
    }

    fn process_completion(&mut self, flow: usize) {
        debug_assert_eq!(self.server.serving, Some(flow));
        if let Some(packet) = self.queues.pop_front(flow) {
            self.stats.record_completion(flow, self.now, &packet);
            self.drr.charge(flow);
            if self.queues.is_empty(flow) {
                self.drr.reset(flow);
            }
            trace!(
                flow,
                now = self.now.as_secs(),
                sojourn = self.now.as_secs() - packet.arrival_time.as_secs(),
                "completion"
            );
        }
        self.server = Server::idle();
        self.dispatch();
    }

    /// Run one DRR pass and start transmitting the granted flow's head
    /// packet, or leave the link idle.
    fn dispatch(&mut self) {
        let granted = self.drr.select(&self.queues).and_then(|flow| {
            self.queues
                .peek_front(flow)
                .map(|packet| (flow, packet.service_time))
        });

        match granted {
            Some((flow, service_time)) => {
                let at = self.now.plus(service_time);
                self.server = Server {
                    serving: Some(flow),
                    completes_at: at,
                };
                self.events.schedule(at, EventKind::Completion { flow });
                trace!(flow, deficit = self.drr.deficit(flow), "link granted");
            }
            None => self.server = Server::idle(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current simulated time.
    pub fn simulated_time(&self) -> SimTime {
        self.now
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Configured traffic of every flow, in flow order.
    pub fn flows(&self) -> impl Iterator<Item = &FlowSpec> + '_ {
        self.flows.iter().map(FlowModel::spec)
    }

    pub fn quantum(&self) -> f64 {
        self.drr.quantum()
    }

    /// Accumulated statistics of `flow`.
    pub fn flow_stats(&self, flow: usize) -> &FlowStats {
        self.stats.flow(flow)
    }

    pub fn packets_served(&self, flow: usize) -> u64 {
        self.stats.flow(flow).packets_served
    }

    /// Sum of arrival-to-departure times, including transmission.
    pub fn total_sojourn_time(&self, flow: usize) -> f64 {
        self.stats.flow(flow).total_sojourn_time
    }

    pub fn total_service_time(&self, flow: usize) -> f64 {
        self.stats.flow(flow).total_service_time
    }

    /// Time integral of `flow`'s queue length.
    pub fn queue_area(&self, flow: usize) -> f64 {
        self.stats.flow(flow).queue_area
    }

    /// Link time attributed to `flow`'s transmissions.
    pub fn busy_time(&self, flow: usize) -> f64 {
        self.stats.flow(flow).busy_time
    }

    /// System busy time integrated over statistics intervals.
    pub fn total_busy_time(&self) -> f64 {
        self.stats.total_busy_time()
    }

    pub fn deficit(&self, flow: usize) -> f64 {
        self.drr.deficit(flow)
    }

    pub fn deficits(&self) -> &[f64] {
        self.drr.deficits()
    }

    pub fn queue_len(&self, flow: usize) -> usize {
        self.queues.size(flow)
    }

    pub fn is_busy(&self) -> bool {
        self.server.serving.is_some()
    }

    /// Flow currently being transmitted.
    pub fn serving(&self) -> Option<usize> {
        self.server.serving
    }

    /// End of the current transmission; `SimTime::NEVER` while idle.
    pub fn next_completion_time(&self) -> SimTime {
        self.server.completes_at
    }

    pub fn next_arrival_time(&self, flow: usize) -> SimTime {
        self.next_arrivals[flow]
    }

    /// Achieved bit rate of every flow; all zero before time advances.
    pub fn throughputs(&self) -> Vec<f64> {
        let elapsed = self.now.as_secs();
        self.stats
            .flows()
            .iter()
            .map(|s| s.throughput_bps(elapsed))
            .collect()
    }

    /// Jain's fairness index over achieved throughputs.
    pub fn fairness_index(&self) -> f64 {
        jain_fairness_index(&self.throughputs())
    }

    /// Offered load of each flow as a fraction of link capacity.
    pub fn calculate_rho(&self) -> Vec<f64> {
        self.flows().map(FlowSpec::theoretical_rho).collect()
    }

    /// Carried load of each CBR flow as a fraction of link capacity.
    /// Poisson flows report 0.
    pub fn calculate_simulated_rho(&self) -> Vec<f64> {
        let elapsed = self.now.as_secs();
        self.flows()
            .zip(self.stats.flows())
            .map(|(spec, stats)| {
                if spec.is_cbr() && elapsed > 0.0 {
                    stats.packets_served as f64 * PACKET_SIZE_BITS / elapsed / LINK_SPEED_BPS
                } else {
                    0.0
                }
            })
            .collect()
    }
}
