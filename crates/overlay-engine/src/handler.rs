//! Shortcut handlers and their failure type.

use std::{any::Any, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use overlay_protocol::HostEvent;
use thiserror::Error;

/// Result returned by a shortcut handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Failure raised inside a handler and caught at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler reported a failure.
    #[error("{0}")]
    Failed(String),
    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Build a [`HandlerError::Failed`] from any displayable message.
    pub fn msg(msg: impl fmt::Display) -> Self {
        Self::Failed(msg.to_string())
    }

    /// Convert a caught panic payload into an error.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let text = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(text)
    }
}

/// Synchronous handler body.
type SyncFn = dyn Fn(&HostEvent) -> HandlerResult + Send + Sync;
/// Asynchronous handler body; the future is spawned and never awaited by the dispatcher.
type AsyncFn = dyn Fn(HostEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// A callback bound to one action.
///
/// Cloning is cheap; the registry hands out clones so the handler runs without
/// any registry lock held.
#[derive(Clone)]
pub enum Handler {
    /// Runs to completion on the delivering thread.
    Sync(Arc<SyncFn>),
    /// Started on a tokio runtime; delivery does not wait for it.
    Async(Arc<AsyncFn>),
}

impl Handler {
    /// Handler that receives the triggering event and may fail.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HostEvent) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Zero-argument, infallible handler.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(move |_| {
            f();
            Ok(())
        }))
    }

    /// Asynchronous handler. Each delivery spawns one future.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(HostEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |ev| f(ev).boxed()))
    }

    /// True for handlers created with [`Handler::from_async`].
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}
