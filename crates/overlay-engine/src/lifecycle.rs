//! One live subscription per event kind, across any number of re-initializations.

use std::{collections::BTreeMap, fmt, mem};

use overlay_protocol::EventKind;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::{EventSink, EventSource, Subscription};

/// Outcome of one initialization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Kinds with a fresh live subscription.
    pub installed: Vec<EventKind>,
    /// Kinds whose subscription failed, with the reason.
    pub failed: Vec<(EventKind, String)>,
    /// Existing subscriptions disposed before re-subscribing.
    pub replaced: usize,
}

impl InitReport {
    /// True when every requested kind is live.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for InitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} installed, {} failed, {} replaced",
            self.installed.len(),
            self.failed.len(),
            self.replaced
        )
    }
}

/// Holds at most one [`Subscription`] per event kind.
#[derive(Debug, Default)]
pub struct ListenerSet {
    /// Live handles keyed by kind.
    handles: Mutex<BTreeMap<EventKind, Subscription>>,
}

impl ListenerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe every kind in `kinds` to `source`, disposing any previous
    /// handle for that kind first.
    ///
    /// A failing kind is logged and recorded; the remaining kinds are still
    /// attempted.
    pub fn install<F>(&self, source: &dyn EventSource, kinds: &[EventKind], mut sink_for: F) -> InitReport
    where
        F: FnMut(EventKind) -> EventSink,
    {
        let mut report = InitReport::default();
        for &kind in kinds {
            let previous = self.handles.lock().remove(&kind);
            if let Some(mut old) = previous {
                old.dispose();
                report.replaced += 1;
                debug!(kind = %kind, "disposed previous subscription");
            }
            match source.subscribe(kind, sink_for(kind)) {
                Ok(sub) => {
                    self.handles.lock().insert(kind, sub);
                    report.installed.push(kind);
                }
                Err(e) => {
                    error!(kind = %kind, error = %e, "failed to subscribe to host event");
                    report.failed.push((kind, e.to_string()));
                }
            }
        }
        info!(%report, "listeners initialized");
        report
    }

    /// Dispose every stored handle. Returns how many were disposed.
    pub fn teardown(&self) -> usize {
        let handles = mem::take(&mut *self.handles.lock());
        let n = handles.len();
        for (kind, mut sub) in handles {
            sub.dispose();
            debug!(kind = %kind, "subscription disposed");
        }
        n
    }

    /// True when `kind` has a live subscription.
    pub fn is_live(&self, kind: EventKind) -> bool {
        self.handles.lock().get(&kind).is_some_and(Subscription::is_live)
    }

    /// Kinds with a live subscription.
    pub fn live_kinds(&self) -> Vec<EventKind> {
        self.handles.lock().keys().copied().collect()
    }

    /// Number of stored handles.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::EventBus;

    fn noop_sink(_: EventKind) -> EventSink {
        Arc::new(|_| {})
    }

    #[test]
    fn reinstall_never_accumulates() {
        let bus = EventBus::new();
        let set = ListenerSet::new();
        for round in 0..5 {
            let report = set.install(&bus, &EventKind::ALL, noop_sink);
            assert!(report.is_complete());
            assert_eq!(report.replaced, if round == 0 { 0 } else { EventKind::ALL.len() });
            for kind in EventKind::ALL {
                assert_eq!(bus.listener_count(kind), 1);
            }
        }
        assert_eq!(set.len(), EventKind::ALL.len());
    }

    #[test]
    fn teardown_runs_once() {
        let bus = EventBus::new();
        let set = ListenerSet::new();
        set.install(&bus, &[EventKind::FocusRequest], noop_sink);
        assert!(set.is_live(EventKind::FocusRequest));
        assert_eq!(set.teardown(), 1);
        assert_eq!(set.teardown(), 0);
        assert_eq!(bus.listener_count(EventKind::FocusRequest), 0);
        assert!(set.is_empty());
    }
}
