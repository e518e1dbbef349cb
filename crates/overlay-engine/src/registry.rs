//! Action-to-handler table with scoped registrations.
//!
//! At most one handler exists per [`ActionId`]; a later registration replaces
//! the earlier one. Each registration is stamped with a token so that a guard
//! belonging to a replaced registration never removes its successor.

use std::{
    collections::HashMap,
    fmt, mem,
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use overlay_protocol::ActionId;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::Handler;

/// A registered handler and the token identifying that registration.
struct Entry {
    /// Registration token.
    token: u64,
    /// Handler to invoke.
    handler: Handler,
}

/// Process-wide table mapping actions to their current handler.
#[derive(Default)]
pub struct CallbackRegistry {
    /// Current entries keyed by action.
    entries: Mutex<HashMap<ActionId, Entry>>,
    /// Source of registration tokens.
    next_token: AtomicU64,
}

impl CallbackRegistry {
    /// Create an empty, shareable registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Install `handler` for `action`, replacing any existing handler.
    ///
    /// The returned guard unregisters on drop, unless the entry has since
    /// been replaced.
    pub fn register(self: &Arc<Self>, action: impl Into<ActionId>, handler: Handler) -> Registration {
        let action = action.into();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        let replaced = self
            .entries
            .lock()
            .insert(action.clone(), Entry { token, handler })
            .is_some();
        if replaced {
            debug!(action = %action, "replaced shortcut handler");
        } else {
            trace!(action = %action, "registered shortcut handler");
        }
        Registration {
            registry: Arc::downgrade(self),
            action,
            token,
            armed: true,
        }
    }

    /// Remove whatever handler is bound to `action`. Returns whether one existed.
    pub fn unregister(&self, action: &str) -> bool {
        let removed = self.entries.lock().remove(action).is_some();
        if removed {
            trace!(action, "unregistered shortcut handler");
        }
        removed
    }

    /// Remove `action` only if it still holds the registration `token`.
    fn unregister_token(&self, action: &str, token: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(action) {
            Some(e) if e.token == token => {
                entries.remove(action);
                trace!(action, "registration guard released handler");
                true
            }
            _ => false,
        }
    }

    /// The handler currently bound to `action`, if any.
    pub fn resolve(&self, action: &str) -> Option<Handler> {
        self.entries.lock().get(action).map(|e| e.handler.clone())
    }

    /// True when `action` has a handler.
    pub fn contains(&self, action: &str) -> bool {
        self.entries.lock().contains_key(action)
    }

    /// Number of bound actions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no action is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Bound actions in sorted order.
    pub fn actions(&self) -> Vec<ActionId> {
        let mut out: Vec<ActionId> = self.entries.lock().keys().cloned().collect();
        out.sort();
        out
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("actions", &self.actions())
            .finish()
    }
}

/// Scope guard for one registration.
///
/// Dropping the guard (or calling [`Registration::dispose`]) removes the
/// handler if it is still the one this guard installed.
#[must_use = "dropping a Registration immediately unregisters its handler"]
pub struct Registration {
    /// Owning registry; weak so guards never keep it alive.
    registry: Weak<CallbackRegistry>,
    /// Action this guard was issued for.
    action: ActionId,
    /// Token of the registration this guard owns.
    token: u64,
    /// Cleared once disposed or detached.
    armed: bool,
}

impl Registration {
    /// Action this registration is bound to.
    pub fn action(&self) -> &ActionId {
        &self.action
    }

    /// True while this guard's handler is the registry's current entry.
    pub fn is_current(&self) -> bool {
        self.armed
            && self.registry.upgrade().is_some_and(|r| {
                r.entries
                    .lock()
                    .get(self.action.as_str())
                    .is_some_and(|e| e.token == self.token)
            })
    }

    /// Unregister now. Returns whether this guard's handler was removed.
    pub fn dispose(mut self) -> bool {
        self.release()
    }

    /// Keep the handler registered for the life of the registry.
    pub fn detach(mut self) {
        self.armed = false;
    }

    /// Release once.
    fn release(&mut self) -> bool {
        if !mem::take(&mut self.armed) {
            return false;
        }
        self.registry
            .upgrade()
            .is_some_and(|r| r.unregister_token(self.action.as_str(), self.token))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("action", &self.action)
            .field("token", &self.token)
            .field("armed", &self.armed)
            .finish()
    }
}
