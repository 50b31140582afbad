//! UseCase: クライアントメッセージのローカル配信
//!
//! Text received from a session goes to every session on this instance that
//! shares its client id, the sender included. It is not relayed to other
//! instances.

use std::sync::Arc;

use crate::{
    domain::Session,
    infrastructure::relay::{DeliveryReport, LocalDispatcher},
};

pub struct BroadcastClientMessageUseCase {
    dispatcher: Arc<LocalDispatcher>,
}

impl BroadcastClientMessageUseCase {
    pub fn new(dispatcher: Arc<LocalDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn execute(&self, from: &Session, text: &str) -> DeliveryReport {
        tracing::info!("Received message from '{}': {}", from.client_id(), text);
        self.dispatcher.deliver_local(from.client_id(), text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientId, ConnectionRepository, Timestamp},
        infrastructure::repository::InMemoryConnectionRepository,
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_client_message_reaches_all_sessions_of_same_client() {
        // テスト項目: クライアントの発言が同じ client id の全セッションに届く
        // given (前提条件):
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        let sender = Session::new(ClientId::from("123"), tx1, Timestamp::new(0));
        repository.register(sender.clone()).await.unwrap();
        repository
            .register(Session::new(ClientId::from("123"), tx2, Timestamp::new(0)))
            .await
            .unwrap();
        repository
            .register(Session::new(ClientId::from("456"), tx3, Timestamp::new(0)))
            .await
            .unwrap();
        let usecase =
            BroadcastClientMessageUseCase::new(Arc::new(LocalDispatcher::new(repository)));

        // when (操作):
        let report = usecase.execute(&sender, "hi").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(rx1.recv().await, Some("hi".to_string()));
        assert_eq!(rx2.recv().await, Some("hi".to_string()));
        assert!(rx3.try_recv().is_err());
    }
}
