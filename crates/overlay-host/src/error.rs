use std::result::Result as StdResult;

use overlay_protocol::{ActionId, RegistrationFailure};
use thiserror::Error;

/// Convenient result type for the host crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while applying shortcut bindings.
#[derive(Debug, Error)]
pub enum Error {
    /// A binding's key combination does not parse. Nothing was changed.
    #[error("Invalid shortcut '{key}' for action '{action}': {source}")]
    InvalidShortcut {
        /// Action the binding belongs to.
        action: ActionId,
        /// Key combination as configured.
        key: String,
        /// Parse failure.
        source: keycombo::ParseError,
    },

    /// Some bindings were registered, these were not.
    #[error("Some shortcuts could not be registered: {}", join_failures(.0))]
    PartialRegistration(Vec<RegistrationFailure>),

    /// The key-registration backend refused an operation.
    #[error("Shortcut backend error: {0}")]
    Backend(String),
}

/// `a (k) - r; b (k) - r`.
fn join_failures(failures: &[RegistrationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
