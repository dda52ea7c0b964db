/// Deficit Round Robin eligibility.
///
/// Decides which flow, if any, is granted the link next. Each pass walks
/// the flows once in round-robin order starting after the cursor. A
/// backlogged flow whose deficit has run out receives one quantum; the
/// first flow whose deficit covers a whole packet wins the link.
///
/// A quantum is only added once the deficit has run out. If the quantum
/// is not a multiple of the packet size, a flow that stays backlogged is
/// left holding a positive remainder smaller than one packet and is never
/// topped up again. A flow whose queue drains has its deficit reset, so
/// the remainder only stalls flows that never go idle.

use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::flow::PACKET_SIZE_BITS;
use crate::queue::QueueBank;

/// Deficit counters and round-robin cursor.
#[derive(Debug, Clone)]
pub struct DeficitRoundRobin {
    quantum: f64,
    deficits: Vec<f64>,
    cursor: usize,
}

impl DeficitRoundRobin {
    /// Create a scheduler for `flows` flows. The cursor starts at flow 0,
    /// so the first pass looks at flow 1 first.
    pub fn new(flows: usize, quantum: f64) -> SimResult<Self> {
        if flows == 0 {
            return Err(SimError::InvalidConfiguration("flow list is empty".into()));
        }
        if !quantum.is_finite() || quantum <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "quantum must be positive and finite, got {}",
                quantum
            )));
        }
        Ok(DeficitRoundRobin {
            quantum,
            deficits: vec![0.0; flows],
            cursor: 0,
        })
    }

    /// Run one eligibility pass over `queues`.
    ///
    /// Returns the flow granted the link, or `None` if no backlogged flow
    /// has enough deficit. Empty flows have their deficit reset to 0.
    /// At most one quantum is granted to each flow per pass.
    pub fn select(&mut self, queues: &QueueBank) -> Option<usize> {
        let n = self.deficits.len();
        let start = self.cursor;
        let mut idx = start;

        loop {
            idx = (idx + 1) % n;

            if queues.is_empty(idx) {
                self.deficits[idx] = 0.0;
            } else {
                if self.deficits[idx] <= 0.0 {
                    self.deficits[idx] += self.quantum;
                    trace!(flow = idx, deficit = self.deficits[idx], "quantum granted");
                }
                if self.deficits[idx] >= PACKET_SIZE_BITS {
                    self.cursor = idx;
                    return Some(idx);
                }
            }

            if idx == start {
                return None;
            }
        }
    }

    /// Consume one packet's worth of deficit from `flow`, floored at 0.
    pub fn charge(&mut self, flow: usize) {
        self.deficits[flow] = (self.deficits[flow] - PACKET_SIZE_BITS).max(0.0);
    }

    /// Forget `flow`'s credit. Called when its queue drains.
    pub fn reset(&mut self, flow: usize) {
        self.deficits[flow] = 0.0;
    }

    pub fn deficit(&self, flow: usize) -> f64 {
        self.deficits[flow]
    }

    /// Current deficit of every flow, in flow order.
    pub fn deficits(&self) -> &[f64] {
        &self.deficits
    }

    /// Index of the flow most recently granted the link.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn quantum(&self) -> f64 {
        self.quantum
    }
}
