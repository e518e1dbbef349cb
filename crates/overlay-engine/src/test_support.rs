//! Test support utilities for overlay-engine integration/unit tests.
//! These helpers are public so integration tests and downstream crates can
//! share them; they carry no behavior the dispatcher depends on.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use overlay_protocol::{EventKind, UiNotice, ipc::UiRx};
use tokio::time::{Instant, sleep};

use crate::{Error, EventSink, EventSource, Handler, Result, Subscription};

/// Event source wrapper that refuses subscriptions for selected kinds.
pub struct FlakySource<S> {
    /// Source that serves every other kind.
    inner: S,
    /// Kinds that fail to subscribe.
    failing: HashSet<EventKind>,
}

impl<S: EventSource> FlakySource<S> {
    /// Wrap `inner`, failing every kind in `failing`.
    pub fn new(inner: S, failing: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            inner,
            failing: failing.into_iter().collect(),
        }
    }
}

impl<S: EventSource> EventSource for FlakySource<S> {
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> Result<Subscription> {
        if self.failing.contains(&kind) {
            return Err(Error::Subscribe {
                kind,
                reason: "listener refused".into(),
            });
        }
        self.inner.subscribe(kind, sink)
    }
}

/// Shared invocation counter.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Increment by one.
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// A sync handler that increments this counter.
    pub fn handler(&self) -> Handler {
        let c = self.clone();
        Handler::from_fn(move || c.bump())
    }
}

/// Drain every notice currently queued on `rx`.
pub fn drain_notices(rx: &mut UiRx) -> Vec<UiNotice> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

/// Wait until `pred` holds, polling every 2ms, up to `timeout_ms`.
pub async fn wait_until<F>(timeout_ms: u64, mut pred: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if pred() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(2)).await;
    }
}
