use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Stable string token naming a logical shortcut action.
///
/// Used as the registry key on the UI side and as the payload discriminator
/// for [`crate::HostEvent::CustomActionFired`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this identifier names one of the built-in actions.
    pub fn is_builtin(&self) -> bool {
        actions::BUILTIN.contains(&self.0.as_str())
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ActionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Well-known action identifiers.
pub mod actions {
    /// Show or hide the dashboard window.
    pub const TOGGLE_DASHBOARD: &str = "toggle_dashboard";
    /// Show or hide the main overlay window.
    pub const TOGGLE_WINDOW: &str = "toggle_window";
    /// Bring the overlay forward and focus its input.
    pub const FOCUS_INPUT: &str = "focus_input";
    /// Modifier prefix for moving the overlay with the arrow keys.
    pub const MOVE_WINDOW: &str = "move_window";
    /// Toggle system audio capture.
    pub const SYSTEM_AUDIO: &str = "system_audio";
    /// Start voice recording.
    pub const AUDIO_RECORDING: &str = "audio_recording";
    /// Capture a screenshot.
    pub const SCREENSHOT: &str = "screenshot";

    /// Arrow directions a `move_window` binding expands into.
    pub const MOVE_DIRECTIONS: [&str; 4] = ["up", "down", "left", "right"];

    /// All built-in action identifiers, in catalog order.
    pub const BUILTIN: [&str; 7] = [
        TOGGLE_DASHBOARD,
        TOGGLE_WINDOW,
        FOCUS_INPUT,
        MOVE_WINDOW,
        SYSTEM_AUDIO,
        AUDIO_RECORDING,
        SCREENSHOT,
    ];

    /// Identifier of the expanded per-direction `move_window` action.
    pub fn move_window_direction(direction: &str) -> String {
        format!("{MOVE_WINDOW}_{direction}")
    }
}
