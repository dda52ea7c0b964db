/// Pending events of the link simulation.
///
/// Every flow always has exactly one pending `Arrival`; the server has at
/// most one pending `Completion`. Events are placed on the event queue
/// and dispatched in deterministic order.

use std::cmp::Ordering;

use crate::time::SimTime;

// ── Event Kind ────────────────────────────────────────────────────────

/// What happens when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new packet of `flow` enters its queue.
    Arrival { flow: usize },
    /// The packet of `flow` currently on the wire finishes transmission.
    Completion { flow: usize },
}

impl EventKind {
    /// The flow this event concerns.
    pub fn flow(&self) -> usize {
        match *self {
            EventKind::Arrival { flow } | EventKind::Completion { flow } => flow,
        }
    }

    /// Tie-break key at equal timestamps: arrivals (by ascending flow)
    /// precede the completion.
    fn rank(&self) -> (u8, usize) {
        match *self {
            EventKind::Arrival { flow } => (0, flow),
            EventKind::Completion { flow } => (1, flow),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Arrival { flow } => write!(f, "Arrival(F{})", flow),
            EventKind::Completion { flow } => write!(f, "Completion(F{})", flow),
        }
    }
}

// ── Event ─────────────────────────────────────────────────────────────

/// A single scheduled event.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// The simulated time at which this event fires.
    pub at: SimTime,

    /// What fires.
    pub kind: EventKind,
}

impl Event {
    pub fn new(at: SimTime, kind: EventKind) -> Self {
        Event { at, kind }
    }
}

/// Ordering: smallest `(at, rank)` first.
///
/// `BinaryHeap` is a max-heap, so the natural ordering is reversed here
/// to make it pop the earliest event.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.kind.rank().cmp(&self.kind.rank()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(at: f64, flow: usize) -> Event {
        Event::new(SimTime::from_secs(at), EventKind::Arrival { flow })
    }

    #[test]
    fn test_event_ordering_by_time() {
        let e1 = arrival(1.0, 3);
        let e2 = arrival(2.0, 0);
        // e1 fires first, so it is "greater" in the reversed ordering.
        assert!(e1 > e2);
    }

    #[test]
    fn test_arrivals_before_completion_at_same_time() {
        let a = arrival(1.0, 5);
        let c = Event::new(SimTime::from_secs(1.0), EventKind::Completion { flow: 0 });
        assert!(a > c);
    }

    #[test]
    fn test_arrivals_tiebreak_by_flow() {
        assert!(arrival(1.0, 0) > arrival(1.0, 1));
    }

    #[test]
    fn test_kind_flow_and_display() {
        let c = EventKind::Completion { flow: 2 };
        assert_eq!(c.flow(), 2);
        assert_eq!(format!("{}", c), "Completion(F2)");
        assert_eq!(format!("{}", EventKind::Arrival { flow: 0 }), "Arrival(F0)");
    }
}
