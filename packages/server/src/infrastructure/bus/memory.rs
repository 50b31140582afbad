//! In-process message bus.
//!
//! All clones of one [`InMemoryMessageBus`] share a broadcast channel, so
//! several server instances in the same process behave like instances
//! connected to the same Redis.
//!
//! Delivery is at-least-once only while every subscriber keeps within
//! [`CHANNEL_CAPACITY`] messages of the newest publish. A subscriber that
//! falls further behind skips the oldest messages it missed (logged as a
//! warning) and continues from the oldest one still buffered.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::{BusError, BusStream, MessageBus};

/// Broadcast capacity. Subscribers that fall further behind lose the oldest
/// messages.
pub const CHANNEL_CAPACITY: usize = 1024;

type BusFrame = (Arc<str>, Arc<[u8]>);

#[derive(Clone)]
pub struct InMemoryMessageBus {
    sender: broadcast::Sender<BusFrame>,
}

impl InMemoryMessageBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError> {
        // Err only means nobody is subscribed right now.
        let receivers = self
            .sender
            .send((Arc::from(channel), Arc::from(payload)))
            .unwrap_or(0);
        tracing::debug!("Published to in-memory channel '{}' ({} receivers)", channel, receivers);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<BusStream, BusError> {
        let receiver = self.sender.subscribe();
        let channel: Arc<str> = Arc::from(channel);

        let stream = futures_util::stream::unfold(receiver, move |mut receiver| {
            let channel = channel.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok((frame_channel, payload)) if frame_channel == channel => {
                            return Some((payload.to_vec(), receiver));
                        }
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                "Subscriber on '{}' lagged, {} messages skipped",
                                channel,
                                skipped
                            );
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lagging_subscriber_skips_oldest_messages() {
        // テスト項目: 容量を超えて遅れた購読者は古いメッセージを失い、残りを順に受け取る
        // given (前提条件):
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.subscribe("onMessage").await.unwrap();
        let overflow = 10;

        // when (操作):
        for i in 0..CHANNEL_CAPACITY + overflow {
            bus.publish("onMessage", i.to_string().into_bytes())
                .await
                .unwrap();
        }

        // then (期待する結果):
        let first = stream.next().await.unwrap();
        assert_eq!(first, overflow.to_string().into_bytes());
        let second = stream.next().await.unwrap();
        assert_eq!(second, (overflow + 1).to_string().into_bytes());
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_bytes() {
        // テスト項目: 購読者が publish されたバイト列を受け取る
        // given (前提条件):
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.subscribe("onMessage").await.unwrap();

        // when (操作):
        bus.publish("onMessage", b"hello".to_vec()).await.unwrap();

        // then (期待する結果):
        assert_eq!(stream.next().await, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        // テスト項目: クローンしたバスは同じチャンネルを共有する（複数インスタンス相当）
        // given (前提条件):
        let bus_a = InMemoryMessageBus::new();
        let bus_b = bus_a.clone();
        let mut stream_a = bus_a.subscribe("onMessage").await.unwrap();
        let mut stream_b = bus_b.subscribe("onMessage").await.unwrap();

        // when (操作):
        bus_b.publish("onMessage", b"x".to_vec()).await.unwrap();

        // then (期待する結果):
        assert_eq!(stream_a.next().await, Some(b"x".to_vec()));
        assert_eq!(stream_b.next().await, Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn test_other_channels_are_filtered() {
        // テスト項目: 別チャンネルのメッセージは届かない
        // given (前提条件):
        let bus = InMemoryMessageBus::new();
        let mut stream = bus.subscribe("onMessage").await.unwrap();

        // when (操作):
        bus.publish("other", b"ignored".to_vec()).await.unwrap();
        bus.publish("onMessage", b"kept".to_vec()).await.unwrap();

        // then (期待する結果):
        let received = tokio::time::timeout(Duration::from_millis(100), stream.next())
            .await
            .unwrap();
        assert_eq!(received, Some(b"kept".to_vec()));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        // テスト項目: 購読者がいなくても publish は成功する
        // given (前提条件):
        let bus = InMemoryMessageBus::new();

        // when (操作):
        let result = bus.publish("onMessage", b"nobody".to_vec()).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
