//! UseCase: セッション接続処理
//!
//! `Opening -> Active`: build the session, register it, then greet it
//! directly (the welcome message does not go through the relay).

use std::sync::Arc;

use dengon_shared::time::Clock;

use crate::domain::{ClientId, ConnectionRepository, PusherChannel, Session, Timestamp};

use super::error::ConnectError;

pub struct ConnectSessionUseCase {
    /// Repository（接続レジストリの抽象化）
    repository: Arc<dyn ConnectionRepository>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Welcome notification sent to a freshly opened session.
    pub fn welcome_message(client_id: &ClientId) -> String {
        format!("Welcome {}, connection established!", client_id)
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `client_id` - セッションを紐づけるクライアント ID
    /// * `sender` - セッションへの送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - 登録済み（Active）のセッション
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(
        &self,
        client_id: ClientId,
        sender: PusherChannel,
    ) -> Result<Session, ConnectError> {
        let session = Session::new(
            client_id.clone(),
            sender,
            Timestamp::new(self.clock.now_millis()),
        );

        let counts = self.repository.register(session.clone()).await?;
        tracing::info!(
            "'{}' connected (session {}), online: {}, sessions for client: {}",
            client_id,
            session.id(),
            counts.online,
            counts.for_client
        );

        if let Err(e) = session.send(Self::welcome_message(&client_id)) {
            tracing::error!("Failed to send welcome to '{}': {}", client_id, e);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::SessionState, infrastructure::repository::InMemoryConnectionRepository};
    use dengon_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn create_usecase() -> (ConnectSessionUseCase, Arc<InMemoryConnectionRepository>) {
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let usecase =
            ConnectSessionUseCase::new(repository.clone(), Arc::new(FixedClock::new(42)));
        (usecase, repository)
    }

    #[tokio::test]
    async fn test_connect_registers_active_session() {
        // テスト項目: 接続すると Active なセッションが登録される
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let session = usecase.execute(ClientId::from("123"), tx).await.unwrap();

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.connected_at(), Timestamp::new(42));
        assert_eq!(repository.online_count().await, 1);
        assert_eq!(repository.lookup(&ClientId::from("123")).await, vec![session]);
    }

    #[tokio::test]
    async fn test_welcome_only_reaches_new_session() {
        // テスト項目: ウェルカム通知は新しいセッションだけに届く
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        usecase.execute(ClientId::from("123"), tx1).await.unwrap();
        assert_eq!(
            rx1.recv().await,
            Some(ConnectSessionUseCase::welcome_message(&ClientId::from("123")))
        );

        // when (操作): 同じ client id で 2 つ目のセッションを接続
        usecase.execute(ClientId::from("123"), tx2).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            rx2.recv().await,
            Some("Welcome 123, connection established!".to_string())
        );
        assert!(rx1.try_recv().is_err());
        assert_eq!(repository.count_for(&ClientId::from("123")).await, 2);
        assert_eq!(repository.online_count().await, 2);
    }

    #[tokio::test]
    async fn test_connect_succeeds_even_if_welcome_fails() {
        // テスト項目: ウェルカム送信に失敗しても登録は成功する
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // when (操作):
        let result = usecase.execute(ClientId::from("123"), tx).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(repository.online_count().await, 1);
    }
}
