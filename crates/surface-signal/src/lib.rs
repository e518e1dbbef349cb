//! Cross-surface signals.
//!
//! Overlay surfaces (the main overlay, the dashboard, settings) render
//! independently and share no memory. A surface that needs to tell another
//! one something small, such as "conversation X was selected", publishes a
//! [`Signal`] into a named slot of a shared [`SlotStore`]; the other surface
//! reads it on its own cadence.
//!
//! The slot is a mailbox, not a queue: the newest write wins and a signal that
//! nobody reads before the next publish is lost. Records never expire on their
//! own; consumers use a [`SignalWatcher`] to ignore records older than a
//! freshness window and to skip records they have already handled.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, trace};

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{FileStore, MemoryStore, SlotStore};

/// Slot used to announce the conversation selected in another surface.
pub const SELECTED_CONVERSATION_SLOT: &str = "conversation-selected";

/// Milliseconds since the Unix epoch, wall clock.
pub fn now_ms() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

/// One published record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Payload identifier, e.g. a conversation id.
    pub id: String,
    /// Writer's wall-clock time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Signal {
    /// Build a record.
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }

    /// Age of the record at `now_ms`; zero if the record is from the future.
    pub fn age_at(&self, now_ms: i64) -> Duration {
        Duration::from_millis(u64::try_from(now_ms.saturating_sub(self.timestamp)).unwrap_or(0))
    }
}

/// Publisher/reader for one slot.
#[derive(Clone)]
pub struct SignalChannel {
    /// Shared store.
    store: Arc<dyn SlotStore>,
    /// Slot key.
    slot: String,
}

impl SignalChannel {
    /// Channel over `slot` in `store`.
    pub fn new(store: Arc<dyn SlotStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    /// Channel over the [`SELECTED_CONVERSATION_SLOT`].
    pub fn selected_conversation(store: Arc<dyn SlotStore>) -> Self {
        Self::new(store, SELECTED_CONVERSATION_SLOT)
    }

    /// Slot key.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Write `{ id, timestamp: now }`, replacing whatever the slot held.
    pub fn publish(&self, id: impl Into<String>) -> Result<Signal> {
        self.publish_at(id, now_ms())
    }

    /// Write `{ id, timestamp }`.
    pub fn publish_at(&self, id: impl Into<String>, timestamp: i64) -> Result<Signal> {
        let signal = Signal::new(id, timestamp);
        self.store.write(&self.slot, &signal)?;
        debug!(slot = %self.slot, id = %signal.id, "signal published");
        Ok(signal)
    }

    /// The most recent record, if any.
    pub fn observe(&self) -> Result<Option<Signal>> {
        self.store.read(&self.slot)
    }

    /// Consumer-side watcher over this channel.
    pub fn watcher(&self, freshness: Duration) -> SignalWatcher {
        SignalWatcher::new(self.clone(), freshness)
    }
}

impl fmt::Debug for SignalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalChannel")
            .field("slot", &self.slot)
            .finish()
    }
}

/// Consumer that yields each fresh record once.
#[derive(Debug)]
pub struct SignalWatcher {
    /// Channel being watched.
    channel: SignalChannel,
    /// Records older than this are ignored.
    freshness: Duration,
    /// Last record returned.
    last: Option<Signal>,
}

impl SignalWatcher {
    /// Watch `channel`, ignoring records older than `freshness`.
    pub fn new(channel: SignalChannel, freshness: Duration) -> Self {
        Self {
            channel,
            freshness,
            last: None,
        }
    }

    /// The newest record, if it differs from the last one returned and is
    /// still fresh. Records are compared by content, not by timestamp: the
    /// slot's write order decides what is newest.
    pub fn poll(&mut self) -> Result<Option<Signal>> {
        self.poll_at(now_ms())
    }

    /// [`SignalWatcher::poll`] evaluated at `now_ms`.
    pub fn poll_at(&mut self, now_ms: i64) -> Result<Option<Signal>> {
        let Some(signal) = self.channel.observe()? else {
            return Ok(None);
        };
        if self.last.as_ref() == Some(&signal) {
            return Ok(None);
        }
        if signal.age_at(now_ms) > self.freshness {
            trace!(slot = %self.channel.slot(), id = %signal.id, "stale signal ignored");
            return Ok(None);
        }
        self.last = Some(signal.clone());
        Ok(Some(signal))
    }

    /// Last record returned by [`SignalWatcher::poll`].
    pub fn last(&self) -> Option<&Signal> {
        self.last.as_ref()
    }
}
