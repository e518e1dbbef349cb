use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the signal crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced by signal stores.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the backing file failed.
    #[error("Signal store I/O error at {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The backing file held something other than a slot map.
    #[error("Signal store is corrupt at {}: {source}", path.display())]
    Corrupt {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Serializing the slot map failed.
    #[error("Signal serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
