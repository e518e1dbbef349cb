//! The shortcut catalog: actions and their per-platform default key combinations.

use keycombo::Platform;
use overlay_protocol::{ActionId, actions};
use serde::{Deserialize, Serialize};

/// Key combination per platform.
///
/// For [`actions::MOVE_WINDOW`] each entry is a modifier-only prefix; the
/// host appends an arrow key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformKeys {
    /// macOS combination.
    pub macos: String,
    /// Windows combination.
    pub windows: String,
    /// Linux combination.
    pub linux: String,
}

impl PlatformKeys {
    /// Same combination on every platform.
    pub fn uniform(key: &str) -> Self {
        Self {
            macos: key.to_string(),
            windows: key.to_string(),
            linux: key.to_string(),
        }
    }

    /// Use `mac` on macOS and `other` on Windows and Linux.
    pub fn split(mac: &str, other: &str) -> Self {
        Self {
            macos: mac.to_string(),
            windows: other.to_string(),
            linux: other.to_string(),
        }
    }

    /// Combination for `platform`.
    pub fn for_platform(&self, platform: Platform) -> &str {
        match platform {
            Platform::MacOs => &self.macos,
            Platform::Windows => &self.windows,
            Platform::Linux => &self.linux,
        }
    }

    /// Iterate `(platform, key)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> {
        Platform::ALL.into_iter().map(|p| (p, self.for_platform(p)))
    }
}

/// One action in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutAction {
    /// Stable identifier.
    pub id: ActionId,
    /// Short display name.
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Default combinations.
    pub default_key: PlatformKeys,
}

impl ShortcutAction {
    /// Catalog entry for a built-in action.
    fn builtin(id: &str, name: &str, description: &str, default_key: PlatformKeys) -> Self {
        Self {
            id: ActionId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            default_key,
        }
    }

    /// True when the key is a modifier-only prefix rather than a full combination.
    pub fn takes_modifier_prefix(&self) -> bool {
        self.id.as_str() == actions::MOVE_WINDOW
    }
}

/// The built-in actions with their default bindings.
pub fn default_actions() -> Vec<ShortcutAction> {
    vec![
        ShortcutAction::builtin(
            actions::TOGGLE_DASHBOARD,
            "Toggle Dashboard",
            "Show or hide the dashboard window",
            PlatformKeys::split("cmd+shift+d", "ctrl+shift+d"),
        ),
        ShortcutAction::builtin(
            actions::TOGGLE_WINDOW,
            "Toggle Window",
            "Show or hide the overlay",
            PlatformKeys::split("cmd+backslash", "ctrl+backslash"),
        ),
        ShortcutAction::builtin(
            actions::FOCUS_INPUT,
            "Focus Input",
            "Bring the overlay forward and focus its input",
            PlatformKeys::split("cmd+shift+i", "ctrl+shift+i"),
        ),
        ShortcutAction::builtin(
            actions::MOVE_WINDOW,
            "Move Window",
            "Move the overlay with the arrow keys while holding these modifiers",
            PlatformKeys::split("cmd", "ctrl"),
        ),
        ShortcutAction::builtin(
            actions::SYSTEM_AUDIO,
            "System Audio",
            "Toggle system audio capture",
            PlatformKeys::split("cmd+shift+m", "ctrl+shift+m"),
        ),
        ShortcutAction::builtin(
            actions::AUDIO_RECORDING,
            "Voice Input",
            "Start a voice recording",
            PlatformKeys::split("cmd+shift+a", "ctrl+shift+a"),
        ),
        ShortcutAction::builtin(
            actions::SCREENSHOT,
            "Screenshot",
            "Capture a screenshot",
            PlatformKeys::split("cmd+shift+s", "ctrl+shift+s"),
        ),
    ]
}
