//! Overlay host.
//!
//! The host owns the global key registrations. It applies a
//! [`ShortcutsConfig`] to a [`ShortcutBackend`], answers "what is bound"
//! queries, and turns fired key combinations into [`HostEvent`]s on an
//! [`EventBus`] that the dispatcher subscribes to.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use keycombo::KeyCombo;
use overlay_engine::EventBus;
use overlay_protocol::{
    ActionId, EventKind, HostEvent, RegistrationFailure, ShortcutsConfig, actions,
};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

mod backend;
mod error;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

pub use backend::ShortcutBackend;
pub use error::{Error, Result};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockBackend;

/// One combination the host intends to register.
#[derive(Debug, Clone)]
struct Planned {
    /// Action fired by the combination.
    action: ActionId,
    /// Key spec as configured (expanded for window movement).
    key: String,
    /// Parsed combination.
    combo: KeyCombo,
}

/// Live registrations.
#[derive(Debug, Default)]
struct Bindings {
    /// Backend id → planned entry.
    by_id: HashMap<u32, Planned>,
    /// Combination → action, for resolving fired combinations.
    by_combo: HashMap<KeyCombo, ActionId>,
}

impl Bindings {
    /// Record a successful registration.
    fn insert(&mut self, id: u32, planned: Planned) {
        self.by_combo
            .insert(planned.combo.clone(), planned.action.clone());
        self.by_id.insert(id, planned);
    }
}

/// Applies shortcut configuration and emits host events.
pub struct ShortcutHost {
    /// Key-registration backend.
    backend: Arc<dyn ShortcutBackend>,
    /// Bus the host emits events on.
    bus: EventBus,
    /// Current registrations.
    bindings: Mutex<Bindings>,
}

impl ShortcutHost {
    /// Create a host with no registrations.
    pub fn new(backend: Arc<dyn ShortcutBackend>, bus: EventBus) -> Self {
        Self {
            backend,
            bus,
            bindings: Mutex::new(Bindings::default()),
        }
    }

    /// The bus host events are emitted on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Replace every registration with the active bindings of `config`.
    ///
    /// All combinations are parsed before anything is unregistered; an invalid
    /// one aborts with [`Error::InvalidShortcut`] and leaves the current
    /// registrations in place. Registration failures do not stop the
    /// remaining bindings; they are emitted as a registration-error event and
    /// returned as [`Error::PartialRegistration`].
    pub fn update_shortcuts(&self, config: &ShortcutsConfig) -> Result<()> {
        let plan = plan(config)?;
        debug!(bindings = config.len(), planned = plan.len(), "updating shortcuts");

        let mut bindings = self.bindings.lock();
        self.unregister_all(&mut bindings);

        let mut failures = Vec::new();
        for planned in plan {
            match self.backend.register(&planned.combo) {
                Ok(id) => {
                    debug!(action = %planned.action, key = %planned.key, id, "registered shortcut");
                    bindings.insert(id, planned);
                }
                Err(e) => {
                    warn!(action = %planned.action, key = %planned.key, error = %e, "failed to register shortcut");
                    failures.push(RegistrationFailure {
                        action: planned.action,
                        key: planned.key,
                        reason: e.to_string(),
                    });
                }
            }
        }
        let registered = bindings.by_id.len();
        drop(bindings);
        info!(registered, failed = failures.len(), "shortcuts updated");

        if failures.is_empty() {
            return Ok(());
        }
        self.bus.emit(HostEvent::RegistrationError(failures.clone()));
        Err(Error::PartialRegistration(failures))
    }

    /// True when at least one binding is live.
    pub fn check_shortcuts_registered(&self) -> bool {
        !self.bindings.lock().by_id.is_empty()
    }

    /// Live bindings as action → key spec.
    pub fn registered_shortcuts(&self) -> BTreeMap<ActionId, String> {
        self.bindings
            .lock()
            .by_id
            .values()
            .map(|p| (p.action.clone(), p.key.clone()))
            .collect()
    }

    /// True when `key` parses as a full key combination.
    pub fn validate_shortcut_key(key: &str) -> bool {
        match KeyCombo::parse(key) {
            Ok(_) => true,
            Err(e) => {
                debug!(key, error = %e, "invalid shortcut");
                false
            }
        }
    }

    /// Handle a fired combination. Unknown combinations are ignored.
    pub fn on_key_combo(&self, combo: &KeyCombo) -> Option<HostEvent> {
        let action = self.bindings.lock().by_combo.get(combo).cloned();
        match action {
            Some(action) => Some(self.trigger(action.as_str())),
            None => {
                debug!(combo = %combo, "fired combination is not bound");
                None
            }
        }
    }

    /// Handle a fired backend registration id. Unknown ids are ignored.
    pub fn on_registration_fired(&self, id: u32) -> Option<HostEvent> {
        let action = self.bindings.lock().by_id.get(&id).map(|p| p.action.clone());
        match action {
            Some(action) => Some(self.trigger(action.as_str())),
            None => {
                debug!(id, "fired registration id is not bound");
                None
            }
        }
    }

    /// Emit the host event for `action` and return it.
    pub fn trigger(&self, action: &str) -> HostEvent {
        let event = event_for_action(action);
        trace!(action, event = %event.kind(), "shortcut triggered");
        self.bus.emit(event.clone());
        event
    }

    /// Unregister everything. Returns how many registrations were dropped.
    pub fn clear(&self) -> usize {
        let mut bindings = self.bindings.lock();
        let n = bindings.by_id.len();
        self.unregister_all(&mut bindings);
        n
    }

    /// Unregister every live binding; failures are logged.
    fn unregister_all(&self, bindings: &mut Bindings) {
        for (id, planned) in bindings.by_id.drain() {
            match self.backend.unregister(id) {
                Ok(()) => trace!(action = %planned.action, key = %planned.key, "unregistered shortcut"),
                Err(e) => {
                    warn!(action = %planned.action, key = %planned.key, error = %e, "failed to unregister shortcut")
                }
            }
        }
        bindings.by_combo.clear();
    }
}

impl Drop for ShortcutHost {
    fn drop(&mut self) {
        let n = self.clear();
        if n > 0 {
            debug!(count = n, "released shortcuts on shutdown");
        }
    }
}

impl fmt::Debug for ShortcutHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutHost")
            .field("registered", &self.registered_shortcuts())
            .finish()
    }
}

/// The host event a fired action produces.
pub fn event_for_action(action: &str) -> HostEvent {
    let bare = match action {
        actions::FOCUS_INPUT | actions::TOGGLE_WINDOW => HostEvent::bare(EventKind::FocusRequest),
        actions::AUDIO_RECORDING => HostEvent::bare(EventKind::StartRecording),
        actions::SCREENSHOT => HostEvent::bare(EventKind::CaptureTrigger),
        actions::SYSTEM_AUDIO => HostEvent::bare(EventKind::ToggleSystemAudio),
        _ => None,
    };
    bare.unwrap_or_else(|| HostEvent::custom(action))
}

/// Parse every active binding, expanding window movement into arrow bindings.
fn plan(config: &ShortcutsConfig) -> Result<Vec<Planned>> {
    let mut out = Vec::new();
    for binding in config.active() {
        let prefix = binding.key.trim();
        if binding.action.as_str() == actions::MOVE_WINDOW {
            for dir in actions::MOVE_DIRECTIONS {
                let key = format!("{prefix}+{dir}");
                let combo = KeyCombo::parse(&key).map_err(|source| Error::InvalidShortcut {
                    action: binding.action.clone(),
                    key: key.clone(),
                    source,
                })?;
                out.push(Planned {
                    action: ActionId::new(actions::move_window_direction(dir)),
                    key,
                    combo,
                });
            }
            continue;
        }
        let combo = KeyCombo::parse(prefix).map_err(|source| Error::InvalidShortcut {
            action: binding.action.clone(),
            key: binding.key.clone(),
            source,
        })?;
        out.push(Planned {
            action: binding.action.clone(),
            key: binding.key.clone(),
            combo,
        });
    }
    Ok(out)
}
