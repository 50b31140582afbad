//! Connection registry interface.
//!
//! The registry is the only owner of session membership and of the online
//! counters. Nothing outside the implementation mutates them.

use async_trait::async_trait;

use super::{ClientId, RepositoryError, Session};

/// Counter snapshot taken atomically with a registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionCounts {
    /// Live sessions across all client ids
    pub online: usize,
    /// Live sessions for the client id involved
    pub for_client: usize,
}

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Add `session` to its client id's set and mark it active.
    ///
    /// Fails if the session is closed or already registered.
    async fn register(&self, session: Session) -> Result<ConnectionCounts, RepositoryError>;

    /// Remove `session` from its client id's set and mark it closed.
    ///
    /// Returns `None` when the session was not registered (double close).
    async fn unregister(&self, session: &Session) -> Option<ConnectionCounts>;

    /// Snapshot of the live sessions for `client_id` (possibly empty).
    async fn lookup(&self, client_id: &ClientId) -> Vec<Session>;

    /// Whether a set for `client_id` exists, even if it is empty.
    async fn exists(&self, client_id: &ClientId) -> bool;

    /// Total live sessions.
    async fn online_count(&self) -> usize;

    /// Live sessions for `client_id`.
    async fn count_for(&self, client_id: &ClientId) -> usize;
}
