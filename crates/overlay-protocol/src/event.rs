use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ActionId, actions};

/// The kinds of notification the host emits, one stream per physical trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// Bring the overlay forward and focus its input.
    FocusRequest,
    /// Begin a voice recording.
    StartRecording,
    /// Capture a screenshot. High-frequency; debounced on delivery.
    CaptureTrigger,
    /// Toggle system audio capture.
    ToggleSystemAudio,
    /// A user-defined (or otherwise unmapped) action fired; payload names it.
    CustomActionFired,
    /// The host failed to bind one or more key combinations.
    RegistrationError,
}

impl EventKind {
    /// Every event kind, in subscription order.
    pub const ALL: [Self; 6] = [
        Self::FocusRequest,
        Self::StartRecording,
        Self::CaptureTrigger,
        Self::ToggleSystemAudio,
        Self::CustomActionFired,
        Self::RegistrationError,
    ];

    /// Host-side event name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::FocusRequest => "focus-text-input",
            Self::StartRecording => "start-audio-recording",
            Self::CaptureTrigger => "trigger-screenshot",
            Self::ToggleSystemAudio => "toggle-system-audio",
            Self::CustomActionFired => "custom-shortcut-triggered",
            Self::RegistrationError => "shortcut-registration-error",
        }
    }

    /// Parse a wire name back into a kind.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wire_name() == name)
    }

    /// The fixed action a payload-less kind is delivered to, if any.
    pub fn fixed_action(self) -> Option<&'static str> {
        match self {
            Self::FocusRequest => Some(actions::FOCUS_INPUT),
            Self::StartRecording => Some(actions::AUDIO_RECORDING),
            Self::CaptureTrigger => Some(actions::SCREENSHOT),
            Self::ToggleSystemAudio => Some(actions::SYSTEM_AUDIO),
            Self::CustomActionFired | Self::RegistrationError => None,
        }
    }

    /// True for kinds gated by the debounce interval before delivery.
    pub fn is_debounced(self) -> bool {
        matches!(self, Self::CaptureTrigger)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single notification received from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// See [`EventKind::FocusRequest`].
    FocusRequest,
    /// See [`EventKind::StartRecording`].
    StartRecording,
    /// See [`EventKind::CaptureTrigger`].
    CaptureTrigger,
    /// See [`EventKind::ToggleSystemAudio`].
    ToggleSystemAudio,
    /// See [`EventKind::CustomActionFired`].
    CustomActionFired {
        /// Action that fired.
        action: ActionId,
    },
    /// See [`EventKind::RegistrationError`].
    RegistrationError(Vec<RegistrationFailure>),
}

impl HostEvent {
    /// The stream this event belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FocusRequest => EventKind::FocusRequest,
            Self::StartRecording => EventKind::StartRecording,
            Self::CaptureTrigger => EventKind::CaptureTrigger,
            Self::ToggleSystemAudio => EventKind::ToggleSystemAudio,
            Self::CustomActionFired { .. } => EventKind::CustomActionFired,
            Self::RegistrationError(_) => EventKind::RegistrationError,
        }
    }

    /// Convenience constructor for a custom action event.
    pub fn custom(action: impl Into<ActionId>) -> Self {
        Self::CustomActionFired {
            action: action.into(),
        }
    }

    /// Build the payload-less event for a kind. Returns `None` for kinds that
    /// carry a payload.
    pub fn bare(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::FocusRequest => Some(Self::FocusRequest),
            EventKind::StartRecording => Some(Self::StartRecording),
            EventKind::CaptureTrigger => Some(Self::CaptureTrigger),
            EventKind::ToggleSystemAudio => Some(Self::ToggleSystemAudio),
            EventKind::CustomActionFired | EventKind::RegistrationError => None,
        }
    }
}

/// One key combination the host could not bind.
///
/// Serialized as an `[actionId, keyCombo, reason]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(ActionId, String, String)",
    into = "(ActionId, String, String)"
)]
pub struct RegistrationFailure {
    /// Action whose binding failed.
    pub action: ActionId,
    /// Key combination as configured.
    pub key: String,
    /// Human-readable reason from the host.
    pub reason: String,
}

impl From<(ActionId, String, String)> for RegistrationFailure {
    fn from((action, key, reason): (ActionId, String, String)) -> Self {
        Self {
            action,
            key,
            reason,
        }
    }
}

impl From<RegistrationFailure> for (ActionId, String, String) {
    fn from(f: RegistrationFailure) -> Self {
        (f.action, f.key, f.reason)
    }
}

impl fmt::Display for RegistrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.action, self.key, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_unique_and_parse_back() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_wire_name(kind.wire_name()), Some(kind));
        }
        assert_eq!(EventKind::from_wire_name("no-such-event"), None);
    }

    #[test]
    fn only_capture_is_debounced() {
        let debounced: Vec<_> = EventKind::ALL
            .into_iter()
            .filter(|k| k.is_debounced())
            .collect();
        assert_eq!(debounced, vec![EventKind::CaptureTrigger]);
    }

    #[test]
    fn registration_failure_is_a_triple() {
        let f = RegistrationFailure {
            action: "screenshot".into(),
            key: "cmd+shift+s".into(),
            reason: "already bound".into(),
        };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["screenshot", "cmd+shift+s", "already bound"])
        );
        assert_eq!(f.to_string(), "screenshot (cmd+shift+s) - already bound");
    }
}
