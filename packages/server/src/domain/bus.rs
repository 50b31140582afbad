//! Pub/sub bus interface.
//!
//! The bus carries relay envelopes between instances. Delivery is
//! at-least-once per subscriber and unordered across publishers. Every
//! instance subscribes to the same channel, including the one that
//! published, so a publish reaches local sessions through the same path as
//! remote ones.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::BusError;

/// Stream of raw message bodies received on one channel.
pub type BusStream = BoxStream<'static, Vec<u8>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish raw bytes on `channel`.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError>;

    /// Subscribe to `channel`. The stream ends when the bus connection is lost.
    async fn subscribe(&self, channel: &str) -> Result<BusStream, BusError>;
}
