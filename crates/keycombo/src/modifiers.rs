use serde::{Deserialize, Serialize};

use crate::Platform;

/// Modifier keys, normalized across platforms.
///
/// `Super` is the Command key on macOS, the Windows key on Windows, and the
/// Super/Meta key on Linux.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modifier {
    /// Command / Windows / Super.
    Super,
    /// Control.
    Control,
    /// Alt / Option.
    Alt,
    /// Shift.
    Shift,
}

impl Modifier {
    /// All modifiers in canonical render order.
    pub const ALL: [Self; 4] = [Self::Super, Self::Control, Self::Alt, Self::Shift];

    /// Parses a modifier specification, case-insensitively.
    ///
    /// Accepts the common alias words: cmd/command/super/meta/win,
    /// ctrl/control, alt/opt/option, shift.
    pub fn from_spec(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cmd" | "command" | "super" | "meta" | "win" | "windows" => Some(Self::Super),
            "ctrl" | "control" => Some(Self::Control),
            "alt" | "opt" | "option" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    /// Returns the canonical, platform-neutral spec string for this modifier.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Super => "super",
            Self::Control => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
        }
    }

    /// Returns the spec string users expect to see on `platform`.
    pub fn to_platform_spec(self, platform: Platform) -> &'static str {
        match (self, platform) {
            (Self::Super, Platform::MacOs) => "cmd",
            (Self::Super, Platform::Windows) => "win",
            (Self::Alt, Platform::MacOs) => "opt",
            _ => self.to_spec(),
        }
    }
}
