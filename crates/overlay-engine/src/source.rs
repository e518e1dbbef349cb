//! The event source seam and the in-process event bus.
//!
//! An [`EventSource`] hands out one [`Subscription`] per `(kind, sink)` pair.
//! [`EventBus`] is the in-process implementation used by the host crate and
//! by tests; anything else (an IPC bridge, a webview listener) implements the
//! same trait.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use overlay_protocol::{EventKind, HostEvent, Value, ipc::wire};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::Result;

/// Callback a source invokes for every event of the subscribed kind.
pub type EventSink = Arc<dyn Fn(HostEvent) + Send + Sync>;

/// Anything that can deliver host events to subscribers.
pub trait EventSource: Send + Sync {
    /// Subscribe `sink` to events of `kind`.
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Result<Subscription>;
}

/// Disposer for one live subscription.
///
/// Disposal is idempotent; dropping a live subscription disposes it.
pub struct Subscription {
    /// Kind this subscription listens to.
    kind: EventKind,
    /// Pending disposer; `None` once disposed.
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a disposer closure.
    pub fn new(kind: EventKind, dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Event kind of this subscription.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// True until disposed.
    pub fn is_live(&self) -> bool {
        self.dispose.is_some()
    }

    /// Dispose the subscription. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(f) = self.dispose.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Listener table shared between a bus and its subscription disposers.
#[derive(Default)]
struct BusInner {
    /// Sinks per kind, in subscription order.
    listeners: Mutex<HashMap<EventKind, Vec<(u64, EventSink)>>>,
    /// Listener id source.
    next_id: AtomicU64,
}

impl BusInner {
    /// Remove listener `id` from `kind`.
    fn remove(&self, kind: EventKind, id: u64) {
        let mut map = self.listeners.lock();
        if let Some(list) = map.get_mut(&kind) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                map.remove(&kind);
            }
        }
    }
}

/// In-process broadcast bus for host events.
///
/// Every sink subscribed to an event's kind receives it, in subscription
/// order. Sinks run on the emitting thread with no bus lock held.
#[derive(Clone, Default)]
pub struct EventBus {
    /// Shared listener table.
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcast `event` to every sink of its kind. Returns the sink count.
    pub fn emit(&self, event: HostEvent) -> usize {
        let kind = event.kind();
        let sinks: Vec<EventSink> = self
            .inner
            .listeners
            .lock()
            .get(&kind)
            .map(|l| l.iter().map(|(_, s)| s.clone()).collect())
            .unwrap_or_default();
        if sinks.is_empty() {
            trace!(kind = %kind, "event emitted with no listeners");
        }
        for sink in &sinks {
            sink(event.clone());
        }
        sinks.len()
    }

    /// Decode a wire event and broadcast it. Malformed events are logged and dropped.
    pub fn emit_wire(&self, name: &str, payload: Value) -> Result<usize> {
        match wire::decode(name, payload) {
            Ok(event) => Ok(self.emit(event)),
            Err(e) => {
                warn!(event = name, error = %e, "dropping malformed host event");
                Err(e.into())
            }
        }
    }

    /// Number of live sinks for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .listeners
            .lock()
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Result<Subscription> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .entry(kind)
            .or_default()
            .push((id, sink));
        let weak: Weak<BusInner> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(kind, move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(kind, id);
            }
        }))
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(EventKind, usize)> = EventKind::ALL
            .into_iter()
            .map(|k| (k, self.listener_count(k)))
            .filter(|(_, n)| *n > 0)
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
