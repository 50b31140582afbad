//! UseCase: 外部トリガーからのメッセージ配信
//!
//! Fire-and-forget: the call returns normally whether or not any session
//! receives the message. Relay failures are logged, never surfaced.

use std::sync::Arc;

use crate::{domain::ClientId, infrastructure::relay::RelayPublisher};

pub struct PublishMessageUseCase {
    publisher: Arc<RelayPublisher>,
}

impl PublishMessageUseCase {
    pub fn new(publisher: Arc<RelayPublisher>) -> Self {
        Self { publisher }
    }

    /// Relay `message` to every session of `client_id` on every instance.
    ///
    /// Returns the message, whether or not the bus accepted it.
    pub async fn execute(&self, client_id: &ClientId, message: String) -> String {
        self.relay(client_id, &message).await;
        message
    }

    /// Publish once per client id. A failure for one id does not stop the
    /// others. Returns how many publishes the bus accepted.
    pub async fn execute_many(&self, client_ids: &[ClientId], message: &str) -> usize {
        let mut accepted = 0;
        for client_id in client_ids {
            if self.relay(client_id, message).await {
                accepted += 1;
            }
        }
        accepted
    }

    async fn relay(&self, client_id: &ClientId, message: &str) -> bool {
        tracing::info!("Publishing to '{}': {}", client_id, message);
        match self.publisher.publish(client_id, message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to relay message for '{}': {}", client_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BusError, MockMessageBus, RelayEnvelope};

    fn create_usecase(bus: MockMessageBus) -> PublishMessageUseCase {
        PublishMessageUseCase::new(Arc::new(RelayPublisher::new(Arc::new(bus), "onMessage")))
    }

    #[tokio::test]
    async fn test_execute_returns_message() {
        // テスト項目: publish はメッセージをそのまま返す
        // given (前提条件):
        let mut bus = MockMessageBus::new();
        bus.expect_publish().times(1).returning(|_, _| Ok(()));
        let usecase = create_usecase(bus);

        // when (操作):
        let message = usecase
            .execute(&ClientId::from("123"), "promo".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(message, "promo");
    }

    #[tokio::test]
    async fn test_execute_returns_normally_on_bus_failure() {
        // テスト項目: バス障害時もエラーにならずメッセージを返す
        // given (前提条件):
        let mut bus = MockMessageBus::new();
        bus.expect_publish()
            .returning(|_, _| Err(BusError::Connection("down".to_string())));
        let usecase = create_usecase(bus);

        // when (操作):
        let message = usecase
            .execute(&ClientId::from("nope-such-id"), "x".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(message, "x");
    }

    #[tokio::test]
    async fn test_execute_many_isolates_failures() {
        // テスト項目: 一部の client id の publish 失敗が他を妨げない
        // given (前提条件):
        let mut bus = MockMessageBus::new();
        bus.expect_publish().times(3).returning(|_, payload| {
            let envelope = RelayEnvelope::decode(&payload).unwrap();
            if envelope.target == "bad" {
                Err(BusError::Connection("down".to_string()))
            } else {
                Ok(())
            }
        });
        let usecase = create_usecase(bus);
        let targets = vec![
            ClientId::from("a"),
            ClientId::from("bad"),
            ClientId::from("b"),
        ];

        // when (操作):
        let accepted = usecase.execute_many(&targets, "sale").await;

        // then (期待する結果):
        assert_eq!(accepted, 2);
    }
}
