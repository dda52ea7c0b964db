/// Deterministic pending-event queue.
///
/// Uses a `BinaryHeap` with reversed `Ord` on `Event` to act as a
/// min-heap keyed by `(at, kind)`. Simultaneous events come out in a fixed
/// order, so two runs from the same seed dispatch identically.

use std::collections::BinaryHeap;

use crate::event::{Event, EventKind};
use crate::time::SimTime;

/// Min-heap of pending events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    queue: BinaryHeap<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        EventQueue {
            queue: BinaryHeap::new(),
        }
    }

    /// Schedule `kind` to fire at `at`.
    pub fn schedule(&mut self, at: SimTime, kind: EventKind) {
        self.queue.push(Event::new(at, kind));
    }

    /// Timestamp of the earliest pending event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|e| e.at)
    }

    /// Pop the earliest event if it fires exactly at `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<Event> {
        if self.queue.peek()?.at == now {
            self.queue.pop()
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
