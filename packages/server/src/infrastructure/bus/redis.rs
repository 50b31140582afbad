//! Redis pub/sub message bus.
//!
//! Publishing goes through a shared `ConnectionManager` (reconnects on its
//! own). Each subscription opens a dedicated pub/sub connection.

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::domain::{BusError, BusStream, MessageBus};

pub struct RedisMessageBus {
    client: redis::Client,
    connection: ConnectionManager,
}

impl RedisMessageBus {
    /// Connect to Redis at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client =
            redis::Client::open(url).map_err(|e| BusError::Connection(e.to_string()))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;

        tracing::info!("Connected to Redis bus at {}", url);

        Ok(Self { client, connection })
    }
}

#[async_trait]
impl MessageBus for RedisMessageBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let mut connection = self.connection.clone();
        let receivers: i64 =
            connection
                .publish(channel, payload)
                .await
                .map_err(|e| BusError::Publish {
                    channel: channel.to_string(),
                    reason: e.to_string(),
                })?;
        tracing::debug!("Published to Redis channel '{}' ({} receivers)", channel, receivers);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<BusStream, BusError> {
        let subscribe_error = |e: redis::RedisError| BusError::Subscribe {
            channel: channel.to_string(),
            reason: e.to_string(),
        };

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(subscribe_error)?;
        pubsub.subscribe(channel).await.map_err(subscribe_error)?;

        tracing::info!("Subscribed to Redis channel '{}'", channel);

        Ok(pubsub
            .into_on_message()
            .map(|msg| msg.get_payload_bytes().to_vec())
            .boxed())
    }
}
