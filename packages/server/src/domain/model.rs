//! Domain models: client identifiers and sessions.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::SendError;

/// Outbound channel of one session.
///
/// The WebSocket writer task drains the receiving half; pushing into this
/// channel never blocks.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Logical client identifier (order id, user id, ...).
///
/// Opaque: not validated or namespaced. Equality is byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique id of one connection, distinguishing sessions that share a [`ClientId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Lifecycle of a session: `Opening -> Active -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Opening = 0,
    Active = 1,
    Closed = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Opening,
            1 => Self::Active,
            _ => Self::Closed,
        }
    }
}

struct SessionInner {
    id: SessionId,
    client_id: ClientId,
    sender: PusherChannel,
    connected_at: Timestamp,
    state: AtomicU8,
}

/// One live bidirectional connection bound to a [`ClientId`].
///
/// Cheap to clone: clones share the transport handle and lifecycle state, so
/// the registry's copy and the connection task's copy always agree on whether
/// the session is still alive.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session in the `Opening` state.
    pub fn new(client_id: ClientId, sender: PusherChannel, connected_at: Timestamp) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::generate(),
                client_id,
                sender,
                connected_at,
                state: AtomicU8::new(SessionState::Opening as u8),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn client_id(&self) -> &ClientId {
        &self.inner.client_id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.inner.connected_at
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// `Opening -> Active`. Returns `false` if the session was not opening.
    pub fn activate(&self) -> bool {
        self.inner
            .state
            .compare_exchange(
                SessionState::Opening as u8,
                SessionState::Active as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to `Closed`. Returns `true` only for the call that performed the
    /// transition.
    pub fn close(&self) -> bool {
        let previous = self
            .inner
            .state
            .swap(SessionState::Closed as u8, Ordering::AcqRel);
        previous != SessionState::Closed as u8
    }

    /// Push a text message to this session.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed(self.id()));
        }
        self.inner
            .sender
            .send(text.into())
            .map_err(|_| SendError::Disconnected(self.id()))
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("client_id", &self.inner.client_id)
            .field("state", &self.state())
            .finish()
    }
}
