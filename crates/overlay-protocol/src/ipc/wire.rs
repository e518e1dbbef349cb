//! Host events travel as `{ "event": <wire name>, "payload": <json> }`.
//!
//! Payload-less kinds carry an empty object. `custom-shortcut-triggered`
//! carries `{ "action": id }` and `shortcut-registration-error` carries an
//! array of `[actionId, keyCombo, reason]` triples.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::{ActionId, EventKind, HostEvent, RegistrationFailure};

/// Errors from encoding/decoding host event envelopes.
#[derive(Debug, Error)]
pub enum WireError {
    /// The event name is not one the dispatcher understands.
    #[error("unknown host event '{0}'")]
    UnknownEvent(String),
    /// The payload did not match the shape expected for the event.
    #[error("malformed payload for '{event}': {source}")]
    Payload {
        /// Wire name of the event.
        event: &'static str,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
    /// The envelope itself could not be parsed.
    #[error(transparent)]
    Envelope(#[from] serde_json::Error),
}

/// Serialized form of a host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Wire name, see [`EventKind::wire_name`].
    pub event: String,
    /// JSON payload.
    #[serde(default)]
    pub payload: Value,
}

/// Payload of `custom-shortcut-triggered`.
#[derive(Serialize, Deserialize)]
struct CustomPayload {
    /// Action that fired.
    action: ActionId,
}

/// Encode a host event into its envelope.
pub fn encode(event: &HostEvent) -> Envelope {
    let payload = match event {
        HostEvent::CustomActionFired { action } => json!({ "action": action }),
        HostEvent::RegistrationError(failures) => {
            serde_json::to_value(failures).unwrap_or(Value::Array(Vec::new()))
        }
        _ => json!({}),
    };
    Envelope {
        event: event.kind().wire_name().to_string(),
        payload,
    }
}

/// Decode an event name and payload into a host event.
pub fn decode(name: &str, payload: Value) -> Result<HostEvent, WireError> {
    let kind =
        EventKind::from_wire_name(name).ok_or_else(|| WireError::UnknownEvent(name.to_string()))?;
    if let Some(ev) = HostEvent::bare(kind) {
        return Ok(ev);
    }
    let event = kind.wire_name();
    match kind {
        EventKind::CustomActionFired => {
            let p: CustomPayload = serde_json::from_value(payload)
                .map_err(|source| WireError::Payload { event, source })?;
            Ok(HostEvent::CustomActionFired { action: p.action })
        }
        _ => {
            let failures: Vec<RegistrationFailure> = serde_json::from_value(payload)
                .map_err(|source| WireError::Payload { event, source })?;
            Ok(HostEvent::RegistrationError(failures))
        }
    }
}

/// Decode a full JSON envelope string.
pub fn decode_str(s: &str) -> Result<HostEvent, WireError> {
    let env: Envelope = serde_json::from_str(s)?;
    decode(&env.event, env.payload)
}
