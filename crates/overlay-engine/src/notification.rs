use overlay_protocol::{NotifyKind, RegistrationFailure, UiNotice, ipc::UiTx};
use tracing::info;

use crate::{Error, Result};

/// Sends advisory notices to every UI surface.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    /// Outbound notice channel.
    tx: UiTx,
}

impl NotificationDispatcher {
    /// Create a new dispatcher from a UI notice channel.
    pub fn new(tx: UiTx) -> Self {
        Self { tx }
    }

    /// Re-broadcast host registration failures.
    pub fn send_registration_error(&self, failures: Vec<RegistrationFailure>) -> Result<()> {
        self.tx
            .send(UiNotice::ShortcutRegistrationError(failures))
            .map_err(|_| Error::ChannelClosed)
    }

    /// Send a notification with the given kind, title, and text.
    pub fn send_notification(&self, kind: NotifyKind, title: String, text: String) -> Result<()> {
        info!(kind = ?kind, title = %title, text = %text, "notification_display");
        self.tx
            .send(UiNotice::Notify { kind, title, text })
            .map_err(|_| Error::ChannelClosed)
    }

    /// Convenience helper to send a warning notification.
    pub fn send_warning(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Warn, title.to_string(), text)
    }
}
