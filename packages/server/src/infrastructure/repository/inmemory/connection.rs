//! In-memory connection registry.
//!
//! Membership and the online counter live behind one `RwLock`, so a reader
//! never sees the counter disagree with the session sets. The per-client
//! count is the size of the client's set rather than a separate counter.
//! Lookups clone the set and release the lock before the caller sends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    ClientId, ConnectionCounts, ConnectionRepository, RepositoryError, Session, SessionId,
    SessionState,
};

#[derive(Default)]
struct RegistryState {
    /// Sets are kept after their last member leaves.
    sessions: HashMap<ClientId, HashMap<SessionId, Session>>,
    online: usize,
}

impl RegistryState {
    fn counts(&self, client_id: &ClientId) -> ConnectionCounts {
        ConnectionCounts {
            online: self.online,
            for_client: self.sessions.get(client_id).map_or(0, HashMap::len),
        }
    }
}

/// Registry backed by a `HashMap` of session sets.
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    state: RwLock<RegistryState>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn register(&self, session: Session) -> Result<ConnectionCounts, RepositoryError> {
        let mut state = self.state.write().await;

        if session.is_closed() {
            return Err(RepositoryError::SessionClosed(session.id()));
        }
        let client_id = session.client_id().clone();
        if state
            .sessions
            .get(&client_id)
            .is_some_and(|set| set.contains_key(&session.id()))
        {
            return Err(RepositoryError::AlreadyRegistered(session.id()));
        }
        if !session.activate() {
            return Err(match session.state() {
                SessionState::Closed => RepositoryError::SessionClosed(session.id()),
                _ => RepositoryError::AlreadyRegistered(session.id()),
            });
        }

        state
            .sessions
            .entry(client_id.clone())
            .or_default()
            .insert(session.id(), session);
        state.online += 1;

        Ok(state.counts(&client_id))
    }

    async fn unregister(&self, session: &Session) -> Option<ConnectionCounts> {
        let mut state = self.state.write().await;
        session.close();

        let removed = state
            .sessions
            .get_mut(session.client_id())
            .and_then(|set| set.remove(&session.id()))
            .is_some();
        if !removed {
            return None;
        }
        state.online = state.online.saturating_sub(1);

        Some(state.counts(session.client_id()))
    }

    async fn lookup(&self, client_id: &ClientId) -> Vec<Session> {
        let state = self.state.read().await;
        state
            .sessions
            .get(client_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn exists(&self, client_id: &ClientId) -> bool {
        self.state.read().await.sessions.contains_key(client_id)
    }

    async fn online_count(&self) -> usize {
        self.state.read().await.online
    }

    async fn count_for(&self, client_id: &ClientId) -> usize {
        self.state.read().await.counts(client_id).for_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister / lookup / exists の基本動作
    // - online と client ごとの接続数がセッション集合と常に一致すること
    // - 二重 unregister が no-op で、カウンタが負にならないこと
    // - 並行実行時にもカウンタが集合と一致すること
    // ========================================

    fn create_test_session(client_id: &str) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(ClientId::from(client_id), tx, Timestamp::new(0)), rx)
    }

    #[tokio::test]
    async fn test_register_two_sessions_same_client() {
        // テスト項目: 同じ client id で 2 セッション登録すると両方のカウントが 2 になる
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (first, _rx1) = create_test_session("123");
        let (second, _rx2) = create_test_session("123");

        // when (操作):
        let first_counts = repo.register(first.clone()).await.unwrap();
        let second_counts = repo.register(second.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(first_counts, ConnectionCounts { online: 1, for_client: 1 });
        assert_eq!(second_counts, ConnectionCounts { online: 2, for_client: 2 });
        let sessions = repo.lookup(&ClientId::from("123")).await;
        assert_eq!(sessions.len(), 2);
        assert!(sessions.contains(&first));
        assert!(sessions.contains(&second));
        assert_eq!(first.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_unregister_one_of_two_sessions() {
        // テスト項目: 片方を登録解除すると残りのセッションだけが残る
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (first, _rx1) = create_test_session("123");
        let (second, _rx2) = create_test_session("123");
        let (other, _rx3) = create_test_session("456");
        repo.register(first.clone()).await.unwrap();
        repo.register(second.clone()).await.unwrap();
        repo.register(other).await.unwrap();

        // when (操作):
        let counts = repo.unregister(&first).await;

        // then (期待する結果):
        assert_eq!(counts, Some(ConnectionCounts { online: 2, for_client: 1 }));
        assert_eq!(repo.lookup(&ClientId::from("123")).await, vec![second]);
        assert!(first.is_closed());
    }

    #[tokio::test]
    async fn test_double_unregister_is_noop() {
        // テスト項目: 二重の登録解除は no-op で、カウンタは負にならない
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (session, _rx) = create_test_session("123");
        repo.register(session.clone()).await.unwrap();
        repo.unregister(&session).await;

        // when (操作):
        let result = repo.unregister(&session).await;

        // then (期待する結果):
        assert_eq!(result, None);
        assert_eq!(repo.online_count().await, 0);
        assert_eq!(repo.count_for(&ClientId::from("123")).await, 0);
    }

    #[tokio::test]
    async fn test_unregister_never_registered_session() {
        // テスト項目: 未登録セッションの登録解除は no-op
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (registered, _rx1) = create_test_session("123");
        let (stranger, _rx2) = create_test_session("123");
        repo.register(registered).await.unwrap();

        // when (操作):
        let result = repo.unregister(&stranger).await;

        // then (期待する結果):
        assert_eq!(result, None);
        assert_eq!(repo.online_count().await, 1);
        assert_eq!(repo.count_for(&ClientId::from("123")).await, 1);
    }

    #[tokio::test]
    async fn test_closed_session_cannot_be_registered() {
        // テスト項目: Closed のセッションは再登録できない
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (session, _rx) = create_test_session("123");
        repo.register(session.clone()).await.unwrap();
        repo.unregister(&session).await;

        // when (操作):
        let result = repo.register(session.clone()).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::SessionClosed(session.id())));
        assert_eq!(repo.online_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_same_session_twice_fails() {
        // テスト項目: 同一セッションの二重登録はエラー
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (session, _rx) = create_test_session("123");
        repo.register(session.clone()).await.unwrap();

        // when (操作):
        let result = repo.register(session.clone()).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::AlreadyRegistered(session.id())));
        assert_eq!(repo.online_count().await, 1);
    }

    #[tokio::test]
    async fn test_exists_after_last_session_leaves() {
        // テスト項目: 最後のセッションが抜けても集合は残り、exists は true
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (session, _rx) = create_test_session("123");
        repo.register(session.clone()).await.unwrap();

        // when (操作):
        repo.unregister(&session).await;

        // then (期待する結果):
        assert!(repo.exists(&ClientId::from("123")).await);
        assert!(repo.lookup(&ClientId::from("123")).await.is_empty());
        assert!(!repo.exists(&ClientId::from("never")).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_unregister_keeps_counts_consistent() {
        // テスト項目: 並行な登録・解除後もカウンタが集合サイズと一致する
        // given (前提条件):
        let repo = Arc::new(InMemoryConnectionRepository::new());
        let client_ids = ["a", "b", "c", "d"];

        // when (操作): 各タスクが 3 セッション登録し、そのうち 1 つを二重に解除
        let mut handles = Vec::new();
        for task in 0..16 {
            let repo = repo.clone();
            let client_id = client_ids[task % client_ids.len()];
            handles.push(tokio::spawn(async move {
                let mut receivers = Vec::new();
                let mut sessions = Vec::new();
                for _ in 0..3 {
                    let (session, rx) = create_test_session(client_id);
                    repo.register(session.clone()).await.unwrap();
                    sessions.push(session);
                    receivers.push(rx);
                }
                repo.unregister(&sessions[0]).await;
                repo.unregister(&sessions[0]).await;
                receivers
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果): 16 タスク x 残り 2 セッション
        assert_eq!(repo.online_count().await, 32);
        let mut sum = 0;
        for client_id in client_ids {
            let id = ClientId::from(client_id);
            let count = repo.count_for(&id).await;
            assert_eq!(count, repo.lookup(&id).await.len());
            assert_eq!(count, 8);
            sum += count;
        }
        assert_eq!(sum, repo.online_count().await);
    }
}
