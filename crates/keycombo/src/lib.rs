//! keycombo: cross-platform key combination specs for global shortcuts.
//!
//! - [`Key`]: non-modifier keys that can end a combination.
//! - [`Modifier`]: modifier keys, normalized across macOS, Windows and Linux.
//! - [`KeyCombo`]: a parsed `modifier+...+key` specification.
//! - [`Platform`]: the platform a binding table is resolved for.

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::Modifier;

mod combo;
pub use combo::{KeyCombo, parse_modifiers};

mod platform;
pub use platform::Platform;

use thiserror::Error;

/// Reasons a key combination spec failed to parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The spec was empty or whitespace.
    #[error("empty key combination")]
    Empty,
    /// Two separators with nothing between them.
    #[error("empty component in key combination")]
    EmptyComponent,
    /// The spec has only modifiers.
    #[error("key combination '{0}' has no key")]
    MissingKey(String),
    /// A modifier position held something that is not a modifier.
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    /// The final component is not a known key.
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}
