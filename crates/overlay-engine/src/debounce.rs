//! Minimum-interval gate for high-frequency triggers.
//!
//! A [`DebounceGate`] keeps one "last accepted" instant. An event is accepted
//! only when at least the configured interval has elapsed since the previous
//! accepted event; rejected events leave the state untouched, so a burst of
//! triggers cannot push the next acceptance further out.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default minimum spacing between accepted capture triggers, in milliseconds.
pub const CAPTURE_DEBOUNCE_MS: u64 = 300;

/// Accepts at most one event per minimum interval.
#[derive(Debug)]
pub struct DebounceGate {
    /// Required spacing between two accepted events.
    min_interval: Duration,
    /// Instant of the last accepted event.
    last: Mutex<Option<Instant>>,
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(CAPTURE_DEBOUNCE_MS))
    }
}

impl DebounceGate {
    /// Create a gate with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// The configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Decide whether an event observed at `now` is delivered.
    ///
    /// Returns `true` and records `now` iff `now - last >= min_interval`.
    /// An instant earlier than the last accepted one is rejected.
    pub fn accept(&self, now: Instant) -> bool {
        let mut last = self.last.lock();
        let open = match *last {
            None => true,
            Some(prev) => now
                .checked_duration_since(prev)
                .is_some_and(|elapsed| elapsed >= self.min_interval),
        };
        if open {
            *last = Some(now);
        }
        open
    }

    /// Forget the last accepted instant.
    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn accepts_first_and_spaced_events() {
        let gate = DebounceGate::default();
        let t0 = Instant::now();
        let accepted: Vec<u64> = [0, 100, 250, 400]
            .into_iter()
            .filter(|ms| gate.accept(at(t0, *ms)))
            .collect();
        assert_eq!(accepted, vec![0, 400]);
    }

    #[test]
    fn boundary_is_inclusive() {
        let gate = DebounceGate::default();
        let t0 = Instant::now();
        assert!(gate.accept(t0));
        assert!(!gate.accept(at(t0, 299)));
        assert!(gate.accept(at(t0, 300)));
    }

    #[test]
    fn backward_instant_is_rejected() {
        let gate = DebounceGate::default();
        let t0 = Instant::now();
        assert!(gate.accept(at(t0, 1000)));
        assert!(!gate.accept(t0));
        // State unchanged: 1000 + 300 still required.
        assert!(!gate.accept(at(t0, 1299)));
        assert!(gate.accept(at(t0, 1300)));
    }

    #[test]
    fn reset_reopens() {
        let gate = DebounceGate::new(Duration::from_secs(60));
        let t0 = Instant::now();
        assert!(gate.accept(t0));
        assert!(!gate.accept(at(t0, 10)));
        gate.reset();
        assert!(gate.accept(at(t0, 10)));
    }

    proptest! {
        #[test]
        fn accepted_events_are_spaced(
            mut offsets in proptest::collection::vec(0u64..5_000, 1..64),
            interval in 1u64..1_000,
        ) {
            offsets.sort_unstable();
            let gate = DebounceGate::new(Duration::from_millis(interval));
            let t0 = Instant::now();
            let accepted: Vec<u64> = offsets
                .iter()
                .copied()
                .filter(|ms| gate.accept(at(t0, *ms)))
                .collect();
            prop_assert_eq!(accepted.first().copied(), offsets.first().copied());
            for pair in accepted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= interval);
            }
        }
    }
}
