use std::result::Result as StdResult;

use overlay_protocol::{EventKind, ipc::wire::WireError};
use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the overlay engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An event source refused a subscription for one event kind.
    #[error("Failed to subscribe to '{kind}': {reason}")]
    Subscribe {
        /// Kind whose subscription failed.
        kind: EventKind,
        /// Source-provided reason.
        reason: String,
    },

    /// An async handler fired with no tokio runtime available to run it.
    #[error("No async runtime available for handler '{0}'")]
    NoRuntime(String),

    /// A host event arrived in a form that could not be decoded.
    #[error("Malformed host event: {0}")]
    Wire(#[from] WireError),

    /// The UI notice channel has been closed by the receiver.
    #[error("UI channel closed")]
    ChannelClosed,
}
