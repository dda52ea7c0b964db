/// Per-flow FIFO packet buffers.
///
/// Buffers are unbounded: there is no admission control and no drop
/// policy, so every arrival is eventually served or still queued.

use std::collections::VecDeque;

use crate::time::SimTime;

/// A queued packet. Created on arrival, dropped once transmitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packet {
    pub arrival_time: SimTime,
    pub service_time: f64,
}

/// One FIFO queue per flow, indexed by flow number.
#[derive(Debug, Clone, Default)]
pub struct QueueBank {
    queues: Vec<VecDeque<Packet>>,
}

impl QueueBank {
    /// Create `flows` empty queues.
    pub fn new(flows: usize) -> Self {
        QueueBank {
            queues: vec![VecDeque::new(); flows],
        }
    }

    /// Append a packet to the tail of `flow`'s queue.
    pub fn push(&mut self, flow: usize, packet: Packet) {
        self.queues[flow].push_back(packet);
    }

    pub fn peek_front(&self, flow: usize) -> Option<&Packet> {
        self.queues[flow].front()
    }

    pub fn pop_front(&mut self, flow: usize) -> Option<Packet> {
        self.queues[flow].pop_front()
    }

    /// Current occupancy of `flow`'s queue.
    pub fn size(&self, flow: usize) -> usize {
        self.queues[flow].len()
    }

    pub fn is_empty(&self, flow: usize) -> bool {
        self.queues[flow].is_empty()
    }

    /// Occupancy of every queue, in flow order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.queues.iter().map(VecDeque::len)
    }

    /// Total packets buffered across all flows.
    pub fn total_backlog(&self) -> usize {
        self.sizes().sum()
    }
}
