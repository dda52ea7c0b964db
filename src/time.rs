/// Simulated time for the link model.
///
/// Timestamps are seconds held in an `f64`. Time advances only when the
/// event queue hands out the next due event, never from wall-clock
/// observation.

use std::cmp::Ordering;

/// A point in simulated time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SimTime(f64);

impl SimTime {
    /// The zero-point of simulated time.
    pub const ZERO: SimTime = SimTime(0.0);

    /// A time that is never reached. Used for "no completion pending".
    pub const NEVER: SimTime = SimTime(f64::INFINITY);

    /// Create a `SimTime` from seconds.
    #[inline]
    pub fn from_secs(secs: f64) -> Self {
        SimTime(secs)
    }

    /// Return the raw number of seconds.
    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// The absolute time `delay` seconds after `self`.
    #[inline]
    pub fn plus(self, delay: f64) -> SimTime {
        SimTime(self.0 + delay)
    }

    /// Seconds elapsed since `earlier`, or `None` if `earlier` is later
    /// than `self`.
    #[inline]
    pub fn duration_since(self, earlier: SimTime) -> Option<f64> {
        if earlier.0 > self.0 {
            None
        } else {
            Some(self.0 - earlier.0)
        }
    }

    /// Returns `true` unless this is `NEVER`.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total order used by the event heap.
    #[inline]
    pub fn total_cmp(&self, other: &SimTime) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}s", self.0)
    }
}
