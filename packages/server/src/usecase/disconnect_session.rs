//! UseCase: セッション切断処理
//!
//! `Active -> Closed` for every way a connection ends. The registry ignores
//! sessions it no longer holds, so running this twice for one session
//! unregisters it once.

use std::{fmt, sync::Arc};

use crate::domain::{ConnectionCounts, ConnectionRepository, Session};

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The client or the server closed the connection.
    Closed,
    /// No frame arrived within the idle timeout.
    IdleTimeout,
    /// Transport or protocol error.
    Error(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::IdleTimeout => f.write_str("idle timeout"),
            Self::Error(cause) => write!(f, "error: {}", cause),
        }
    }
}

pub struct DisconnectSessionUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl DisconnectSessionUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 切断を実行
    ///
    /// Returns the counts after removal, or `None` if the session had
    /// already been unregistered.
    pub async fn execute(
        &self,
        session: &Session,
        reason: DisconnectReason,
    ) -> Option<ConnectionCounts> {
        if let DisconnectReason::Error(cause) = &reason {
            tracing::error!(
                "Session {} of '{}' failed: {}",
                session.id(),
                session.client_id(),
                cause
            );
        }

        let counts = self.repository.unregister(session).await;
        match counts {
            Some(counts) => tracing::info!(
                "'{}' disconnected (session {}, {}), online: {}, sessions for client: {}",
                session.client_id(),
                session.id(),
                reason,
                counts.online,
                counts.for_client
            ),
            None => tracing::debug!(
                "Session {} of '{}' was already unregistered",
                session.id(),
                session.client_id()
            ),
        }
        counts
    }
}
