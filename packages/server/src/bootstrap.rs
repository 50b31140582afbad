//! Wiring of one server instance.
//!
//! Dependencies are built in order:
//! 1. Repository (connection registry)
//! 2. Relay (dispatcher, publisher, subscriber) on the shared bus
//! 3. UseCases
//! 4. Server

use std::sync::Arc;

use dengon_shared::time::SystemClock;

use crate::{
    config::ServerConfig,
    domain::{BusError, MessageBus},
    infrastructure::{
        bus::InMemoryMessageBus,
        relay::{LocalDispatcher, RelayPublisher, RelaySubscriber},
        repository::InMemoryConnectionRepository,
    },
    ui::Server,
    usecase::{
        BroadcastClientMessageUseCase, ConnectSessionUseCase, DisconnectSessionUseCase,
        GetConnectionStatsUseCase, PublishMessageUseCase,
    },
};

/// One server instance: its HTTP/WebSocket server and its relay subscriber.
///
/// The subscriber is not running yet; start it before serving so this
/// instance's own publishes come back to its sessions.
pub struct Instance {
    pub server: Server,
    pub subscriber: Arc<RelaySubscriber>,
}

impl Instance {
    pub fn new(bus: Arc<dyn MessageBus>, config: &ServerConfig) -> Self {
        // 1. Repository
        let repository = Arc::new(InMemoryConnectionRepository::new());

        // 2. Relay
        let dispatcher = Arc::new(LocalDispatcher::new(repository.clone()));
        let publisher = Arc::new(RelayPublisher::new(bus.clone(), config.channel.clone()));
        let subscriber = Arc::new(RelaySubscriber::new(
            bus,
            config.channel.clone(),
            dispatcher.clone(),
        ));

        // 3. UseCases
        let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
            repository.clone(),
            Arc::new(SystemClock),
        ));
        let disconnect_session_usecase =
            Arc::new(DisconnectSessionUseCase::new(repository.clone()));
        let broadcast_client_message_usecase =
            Arc::new(BroadcastClientMessageUseCase::new(dispatcher));
        let publish_message_usecase = Arc::new(PublishMessageUseCase::new(publisher));
        let get_connection_stats_usecase = Arc::new(GetConnectionStatsUseCase::new(repository));

        // 4. Server
        let server = Server::new(
            connect_session_usecase,
            disconnect_session_usecase,
            broadcast_client_message_usecase,
            publish_message_usecase,
            get_connection_stats_usecase,
            config.idle_timeout,
        );

        Self { server, subscriber }
    }
}

/// Open the bus named by the configuration.
///
/// Without a Redis URL the bus is in-process and the instance runs alone.
pub async fn connect_bus(config: &ServerConfig) -> Result<Arc<dyn MessageBus>, BusError> {
    match &config.redis_url {
        None => {
            tracing::info!("No Redis URL configured, using in-process bus");
            Ok(Arc::new(InMemoryMessageBus::new()))
        }
        #[cfg(feature = "redis")]
        Some(url) => {
            let bus = crate::infrastructure::bus::RedisMessageBus::connect(url).await?;
            Ok(Arc::new(bus))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => Err(BusError::Connection(
            "built without the `redis` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_connect_bus_without_redis_url_uses_memory_bus() {
        // テスト項目: Redis URL 未設定時はプロセス内バスが使われる
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let bus = connect_bus(&config).await.unwrap();
        let mut stream = bus.subscribe(&config.channel).await.unwrap();
        bus.publish(&config.channel, b"ping".to_vec()).await.unwrap();

        // then (期待する結果):
        assert_eq!(stream.next().await, Some(b"ping".to_vec()));
    }
}
