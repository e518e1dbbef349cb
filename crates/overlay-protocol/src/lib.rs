//! Shared protocol types for the overlay.
//!
//! This crate holds the vocabulary spoken between the native host and the
//! UI-side dispatcher:
//! - [`ActionId`]: stable string token naming a logical shortcut action
//! - [`EventKind`] and [`HostEvent`]: notifications emitted by the host
//! - [`ShortcutsConfig`]: the binding table handed to the host
//! - [`UiNotice`]: advisory messages re-broadcast to every surface
//!
//! Wire encoding of host events lives in [`ipc::wire`].

mod action;
mod event;
mod shortcut;

pub use action::{ActionId, actions};
pub use event::{EventKind, HostEvent, RegistrationFailure};
pub use serde_json::Value;
pub use shortcut::{ShortcutBinding, ShortcutsConfig};

use serde::{Deserialize, Serialize};

/// IPC-related helpers: channel aliases and the host event wire codec.
pub mod ipc {
    use super::UiNotice;

    /// Tokio unbounded sender for UI notices.
    pub type UiTx = tokio::sync::mpsc::UnboundedSender<UiNotice>;
    /// Tokio unbounded receiver for UI notices.
    pub type UiRx = tokio::sync::mpsc::UnboundedReceiver<UiNotice>;

    /// Create a standard unbounded UI notice channel (sender, receiver).
    pub fn ui_channel() -> (UiTx, UiRx) {
        tokio::sync::mpsc::unbounded_channel::<UiNotice>()
    }

    /// Envelope codec for host events.
    pub mod wire;
}

/// Advisory messages delivered to every surface over the UI notice channel.
///
/// Surfaces that never register shortcut handlers still receive these, so a
/// settings screen can show a registration warning without knowing about the
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum UiNotice {
    /// The host could not bind one or more key combinations.
    ShortcutRegistrationError(Vec<RegistrationFailure>),

    /// Generic notification request for the UI.
    Notify {
        kind: NotifyKind,
        title: String,
        text: String,
    },
}

/// Severity of a [`UiNotice::Notify`] message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NotifyKind {
    Info,
    Warn,
    Error,
    Success,
}
