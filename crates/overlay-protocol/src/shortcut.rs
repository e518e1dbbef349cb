use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ActionId;

/// A single action → key combination binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutBinding {
    /// Action this binding triggers.
    pub action: ActionId,
    /// Key combination spec, e.g. `cmd+shift+s`. For `move_window` this is a
    /// modifier-only prefix.
    pub key: String,
    /// Disabled bindings are skipped by the host.
    pub enabled: bool,
}

impl ShortcutBinding {
    /// Construct an enabled binding.
    pub fn new(action: impl Into<ActionId>, key: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            key: key.into(),
            enabled: true,
        }
    }

    /// True when the host should attempt to bind this entry.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.trim().is_empty()
    }
}

/// The full binding table for one platform, keyed by action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutsConfig {
    /// Bindings keyed by action identifier.
    pub bindings: BTreeMap<ActionId, ShortcutBinding>,
}

impl ShortcutsConfig {
    /// Build a config from a list of bindings. Later duplicates replace earlier ones.
    pub fn from_bindings(bindings: impl IntoIterator<Item = ShortcutBinding>) -> Self {
        let bindings = bindings
            .into_iter()
            .map(|b| (b.action.clone(), b))
            .collect();
        Self { bindings }
    }

    /// Insert or replace a binding.
    pub fn insert(&mut self, binding: ShortcutBinding) {
        self.bindings.insert(binding.action.clone(), binding);
    }

    /// Number of bindings, active or not.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when there are no bindings at all.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate bindings the host should attempt to bind.
    pub fn active(&self) -> impl Iterator<Item = &ShortcutBinding> {
        self.bindings.values().filter(|b| b.is_active())
    }
}
