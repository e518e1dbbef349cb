//! In-memory capture of tracing events.
//!
//! Install [`CaptureLayer`] in a scoped subscriber to assert on what a piece
//! of code logged:
//!
//! ```ignore
//! let (layer, logs) = logging::capture::layer();
//! let subscriber = tracing_subscriber::registry().with(layer);
//! tracing::subscriber::with_default(subscriber, || { /* ... */ });
//! assert!(logs.contains("WARN", "no handler"));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::fmt::{RenderedLog, render_event};

/// Shared buffer of captured events.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    /// Rendered events in arrival order.
    inner: Arc<Mutex<Vec<RenderedLog>>>,
}

impl CapturedLogs {
    /// Snapshot all captured events.
    pub fn all(&self) -> Vec<RenderedLog> {
        self.inner.lock().clone()
    }

    /// Events at `level` (e.g. "WARN") whose message contains `needle`.
    pub fn matching(&self, level: &str, needle: &str) -> Vec<RenderedLog> {
        self.inner
            .lock()
            .iter()
            .filter(|r| r.level == level && r.message.contains(needle))
            .cloned()
            .collect()
    }

    /// True when at least one event matches `level` and `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        !self.matching(level, needle).is_empty()
    }

    /// Number of captured events at `level`.
    pub fn count_level(&self, level: &str) -> usize {
        self.inner.lock().iter().filter(|r| r.level == level).count()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

/// Tracing layer that appends every event to a [`CapturedLogs`] buffer.
pub struct CaptureLayer {
    /// Destination buffer.
    logs: CapturedLogs,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.logs.inner.lock().push(render_event(event));
    }
}

/// Create a capture layer and the handle used to inspect what it recorded.
pub fn layer() -> (CaptureLayer, CapturedLogs) {
    let logs = CapturedLogs::default();
    (CaptureLayer { logs: logs.clone() }, logs)
}

#[cfg(test)]
mod tests {
    use tracing::{info, warn};
    use tracing_subscriber::prelude::*;

    use super::*;

    #[test]
    fn records_events_with_fields() {
        let (layer, logs) = layer();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            info!(target: "test_capture", "hello world");
            warn!(action = "screenshot", "no handler registered");
        });

        let all = logs.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].target, "test_capture");
        assert_eq!(all[0].message, "hello world");
        assert!(logs.contains("WARN", "no handler registered"));
        assert!(logs.contains("WARN", "action=\"screenshot\""));
        assert_eq!(logs.count_level("INFO"), 1);

        logs.clear();
        assert!(logs.all().is_empty());
    }
}
