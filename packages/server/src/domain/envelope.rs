//! Relay envelope exchanged over the pub/sub bus.
//!
//! Wire format: a UTF-8 encoded JSON object with exactly two string fields,
//! `key` (target client id) and `value` (message text). Unknown fields are
//! ignored; a missing field is a decode failure. Publisher and subscriber
//! share this format as a fixed contract.

use serde::{Deserialize, Serialize};

use super::{ClientId, EnvelopeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    /// Target client id
    #[serde(rename = "key")]
    pub target: String,
    /// Message text delivered verbatim to every session of `target`
    #[serde(rename = "value")]
    pub payload: String,
}

impl RelayEnvelope {
    pub fn new(target: &ClientId, payload: impl Into<String>) -> Self {
        Self {
            target: target.as_str().to_string(),
            payload: payload.into(),
        }
    }

    pub fn target_client_id(&self) -> ClientId {
        ClientId::new(self.target.clone())
    }

    /// Serialize to UTF-8 JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(EnvelopeError::Encode)
    }

    /// Parse UTF-8 JSON bytes.
    ///
    /// An empty (or whitespace-only) body is reported as
    /// [`EnvelopeError::Empty`] rather than a parse error.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(EnvelopeError::Empty);
        }
        serde_json::from_slice(bytes).map_err(EnvelopeError::Decode)
    }
}
