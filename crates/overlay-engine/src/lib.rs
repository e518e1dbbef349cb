//! Overlay Engine
//!
//! The engine routes host shortcut events to whichever UI surface currently
//! owns the target action:
//! - subscribes once per event kind to an [`EventSource`], surviving repeated
//!   initialization without accumulating duplicate subscriptions
//! - suppresses rapid-fire capture triggers with a [`DebounceGate`]
//! - resolves the target handler through the [`CallbackRegistry`]
//! - isolates handler failures (errors, panics, failed async tasks)
//! - re-broadcasts registration failures to every surface as UI notices
//!
//! The primary type is [`Dispatcher`]. Construct one at startup and pass
//! clones to every surface that registers handlers.
use std::{
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

mod debounce;
mod error;
mod handler;
mod lifecycle;
mod notification;
mod registry;
mod source;
pub mod test_support;

use futures::FutureExt;
use overlay_protocol::{ActionId, EventKind, HostEvent, RegistrationFailure, actions};
use tokio::runtime::Handle;
use tracing::{debug, error, trace, warn};

pub use debounce::{CAPTURE_DEBOUNCE_MS, DebounceGate};
pub use error::{Error, Result};
pub use handler::{Handler, HandlerError, HandlerResult};
pub use lifecycle::{InitReport, ListenerSet};
pub use notification::NotificationDispatcher;
pub use registry::{CallbackRegistry, Registration};
pub use source::{EventBus, EventSink, EventSource, Subscription};

/// What happened to a single delivered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A synchronous handler ran to completion.
    Handled(ActionId),
    /// An asynchronous handler was started.
    Spawned(ActionId),
    /// The handler failed; the failure was logged.
    Failed(ActionId),
    /// Suppressed by the debounce gate.
    Debounced,
    /// No handler is bound to the target action.
    NoHandler(ActionId),
    /// Registration failures were re-broadcast to UI surfaces.
    Rebroadcast,
}

impl Delivery {
    /// True when a handler was invoked (successfully or not).
    pub fn reached_handler(&self) -> bool {
        matches!(self, Self::Handled(_) | Self::Spawned(_) | Self::Failed(_))
    }
}

/// Construction options for a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Minimum spacing between accepted capture triggers.
    pub capture_debounce: Duration,
    /// Runtime used to start async handlers. Falls back to the ambient runtime.
    pub runtime: Option<Handle>,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            capture_debounce: Duration::from_millis(CAPTURE_DEBOUNCE_MS),
            runtime: None,
        }
    }
}

/// State shared by every clone of a dispatcher.
struct Inner {
    /// Action to handler table.
    registry: Arc<CallbackRegistry>,
    /// One gate per debounced event kind.
    gates: HashMap<EventKind, DebounceGate>,
    /// Live subscriptions, one per kind.
    listeners: ListenerSet,
    /// UI notice sender.
    notifier: NotificationDispatcher,
    /// Runtime captured at construction.
    runtime: Option<Handle>,
}

/// Routes host events to registered handlers.
///
/// Cloning is cheap and every clone shares the same registry, debounce state
/// and subscriptions. Subscription sinks hold only a weak reference, so
/// dropping the last clone tears everything down.
#[derive(Clone)]
pub struct Dispatcher {
    /// Shared state.
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher with default options.
    pub fn new(notifier: NotificationDispatcher) -> Self {
        Self::with_options(notifier, DispatcherOptions::default())
    }

    /// Create a dispatcher with explicit options.
    pub fn with_options(notifier: NotificationDispatcher, options: DispatcherOptions) -> Self {
        let gates = EventKind::ALL
            .into_iter()
            .filter(|k| k.is_debounced())
            .map(|k| (k, DebounceGate::new(options.capture_debounce)))
            .collect();
        Self {
            inner: Arc::new(Inner {
                registry: CallbackRegistry::new(),
                gates,
                listeners: ListenerSet::new(),
                notifier,
                runtime: options.runtime.or_else(|| Handle::try_current().ok()),
            }),
        }
    }

    /// The callback registry backing this dispatcher.
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.inner.registry
    }

    /// Bind `handler` to `action`, replacing any previous handler.
    pub fn register(&self, action: impl Into<ActionId>, handler: Handler) -> Registration {
        self.inner.registry.register(action, handler)
    }

    /// Remove the handler bound to `action`.
    pub fn unregister(&self, action: &str) -> bool {
        self.inner.registry.unregister(action)
    }

    /// Handle focus requests.
    pub fn on_focus_request(&self, handler: Handler) -> Registration {
        self.register(actions::FOCUS_INPUT, handler)
    }

    /// Handle start-recording requests.
    pub fn on_start_recording(&self, handler: Handler) -> Registration {
        self.register(actions::AUDIO_RECORDING, handler)
    }

    /// Handle (debounced) capture triggers.
    pub fn on_capture(&self, handler: Handler) -> Registration {
        self.register(actions::SCREENSHOT, handler)
    }

    /// Handle system audio toggles.
    pub fn on_toggle_system_audio(&self, handler: Handler) -> Registration {
        self.register(actions::SYSTEM_AUDIO, handler)
    }

    /// Handle a custom action delivered through the custom-action stream.
    pub fn on_custom(&self, action: impl Into<ActionId>, handler: Handler) -> Registration {
        self.register(action, handler)
    }

    /// Subscribe to every event kind on `source`.
    ///
    /// Safe to call repeatedly: existing subscriptions are disposed before
    /// new ones are created, so each host event is delivered exactly once.
    pub fn subscribe(&self, source: &dyn EventSource) -> InitReport {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .listeners
            .install(source, &EventKind::ALL, |kind| sink_for(weak.clone(), kind))
    }

    /// Dispose every subscription. Later calls are no-ops.
    pub fn shutdown(&self) -> usize {
        let n = self.inner.listeners.teardown();
        if n > 0 {
            debug!(count = n, "dispatcher shut down");
        }
        n
    }

    /// True when `kind` has a live subscription.
    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.inner.listeners.is_live(kind)
    }

    /// Kinds with a live subscription.
    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        self.inner.listeners.live_kinds()
    }

    /// Deliver one event observed now.
    pub fn deliver(&self, event: HostEvent) -> Delivery {
        self.deliver_at(event, Instant::now())
    }

    /// Deliver one event observed at `now`.
    pub fn deliver_at(&self, event: HostEvent, now: Instant) -> Delivery {
        let kind = event.kind();
        if let Some(gate) = self.inner.gates.get(&kind)
            && !gate.accept(now)
        {
            trace!(kind = %kind, "debounced");
            return Delivery::Debounced;
        }
        match &event {
            HostEvent::RegistrationError(failures) => self.rebroadcast(failures),
            HostEvent::CustomActionFired { action } => {
                let action = action.clone();
                match self.inner.registry.resolve(action.as_str()) {
                    Some(handler) => self.invoke(action, handler, event),
                    None => {
                        warn!(action = %action, "no handler registered for custom shortcut");
                        self.notify_warning(
                            "Shortcut",
                            format!("No handler registered for '{action}'"),
                        );
                        Delivery::NoHandler(action)
                    }
                }
            }
            _ => {
                let Some(fixed) = kind.fixed_action() else {
                    return Delivery::NoHandler(ActionId::new(kind.wire_name()));
                };
                let action = ActionId::new(fixed);
                match self.inner.registry.resolve(fixed) {
                    Some(handler) => self.invoke(action, handler, event),
                    None => {
                        debug!(kind = %kind, action = %action, "no handler; event dropped");
                        Delivery::NoHandler(action)
                    }
                }
            }
        }
    }

    /// Log registration failures and forward them to every surface.
    fn rebroadcast(&self, failures: &[RegistrationFailure]) -> Delivery {
        for f in failures {
            warn!(action = %f.action, key = %f.key, reason = %f.reason, "shortcut registration failed");
        }
        if self
            .inner
            .notifier
            .send_registration_error(failures.to_vec())
            .is_err()
        {
            debug!("UI channel closed; registration error not forwarded");
        }
        Delivery::Rebroadcast
    }

    /// Send a warning notice, tolerating a closed channel.
    fn notify_warning(&self, title: &str, text: String) {
        if self.inner.notifier.send_warning(title, text).is_err() {
            debug!("UI channel closed; warning not forwarded");
        }
    }

    /// Run `handler` with failure isolation.
    fn invoke(&self, action: ActionId, handler: Handler, event: HostEvent) -> Delivery {
        match handler {
            Handler::Sync(f) => match panic::catch_unwind(AssertUnwindSafe(|| f(&event))) {
                Ok(Ok(())) => {
                    trace!(action = %action, "handler completed");
                    Delivery::Handled(action)
                }
                Ok(Err(e)) => {
                    error!(action = %action, error = %e, "shortcut handler failed");
                    Delivery::Failed(action)
                }
                Err(payload) => {
                    let e = HandlerError::from_panic(payload);
                    error!(action = %action, error = %e, "shortcut handler failed");
                    Delivery::Failed(action)
                }
            },
            Handler::Async(f) => {
                let Some(rt) = self.runtime() else {
                    let e = Error::NoRuntime(action.to_string());
                    error!(action = %action, error = %e, "shortcut handler not started");
                    return Delivery::Failed(action);
                };
                let fut = match panic::catch_unwind(AssertUnwindSafe(|| f(event))) {
                    Ok(fut) => fut,
                    Err(payload) => {
                        let e = HandlerError::from_panic(payload);
                        error!(action = %action, error = %e, "shortcut handler failed");
                        return Delivery::Failed(action);
                    }
                };
                let task_action = action.clone();
                rt.spawn(async move {
                    let outcome = AssertUnwindSafe(fut)
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|p| Err(HandlerError::from_panic(p)));
                    match outcome {
                        Ok(()) => trace!(action = %task_action, "async handler completed"),
                        Err(e) => {
                            error!(action = %task_action, error = %e, "async shortcut handler failed")
                        }
                    }
                });
                Delivery::Spawned(action)
            }
        }
    }

    /// Captured runtime, else the ambient one.
    fn runtime(&self) -> Option<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.inner.registry)
            .field("subscribed", &self.subscribed_kinds())
            .finish()
    }
}

/// Sink that forwards `kind` events to the dispatcher while it is alive.
fn sink_for(weak: Weak<Inner>, kind: EventKind) -> EventSink {
    Arc::new(move |event: HostEvent| {
        if event.kind() != kind {
            warn!(expected = %kind, got = %event.kind(), "event arrived on the wrong stream");
            return;
        }
        match weak.upgrade() {
            Some(inner) => {
                Dispatcher { inner }.deliver(event);
            }
            None => trace!(kind = %kind, "dispatcher dropped; event ignored"),
        }
    })
}
