//! Domain error types.

use thiserror::Error;

use super::SessionId;

/// Sending to one session failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The connection's writer is gone (reset, broken pipe, task ended).
    #[error("session {0} is disconnected")]
    Disconnected(SessionId),

    /// The session already reached its terminal state.
    #[error("session {0} is closed")]
    Closed(SessionId),
}

/// Relay envelope could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("relay message body is empty")]
    Empty,

    #[error("failed to encode relay envelope: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode relay envelope: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Pub/sub bus failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus connection failed: {0}")]
    Connection(String),

    #[error("failed to publish to channel '{channel}': {reason}")]
    Publish { channel: String, reason: String },

    #[error("failed to subscribe to channel '{channel}': {reason}")]
    Subscribe { channel: String, reason: String },
}

/// Connection registry failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("session {0} is closed and cannot be registered")]
    SessionClosed(SessionId),

    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),
}
