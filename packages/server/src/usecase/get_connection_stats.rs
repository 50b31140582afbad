//! UseCase: 接続数の取得

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRepository, Session};

/// Connection state of one client id on this instance.
#[derive(Debug, Clone)]
pub struct ClientStats {
    pub client_id: ClientId,
    pub exists: bool,
    pub sessions: Vec<Session>,
}

impl ClientStats {
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

pub struct GetConnectionStatsUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl GetConnectionStatsUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    pub async fn online(&self) -> usize {
        self.repository.online_count().await
    }

    pub async fn for_client(&self, client_id: ClientId) -> ClientStats {
        let sessions = self.repository.lookup(&client_id).await;
        let exists = !sessions.is_empty() || self.repository.exists(&client_id).await;
        ClientStats {
            client_id,
            exists,
            sessions,
        }
    }
}
