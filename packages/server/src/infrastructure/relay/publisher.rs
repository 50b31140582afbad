//! Relay publisher: puts envelopes on the shared bus channel.

use std::sync::Arc;

use crate::domain::{ClientId, MessageBus, RelayEnvelope};

use super::RelayError;

pub struct RelayPublisher {
    bus: Arc<dyn MessageBus>,
    channel: String,
}

impl RelayPublisher {
    pub fn new(bus: Arc<dyn MessageBus>, channel: impl Into<String>) -> Self {
        Self {
            bus,
            channel: channel.into(),
        }
    }

    /// Publish `message` for `client_id` to every instance, this one included.
    ///
    /// Does not deliver locally: local sessions receive the message when
    /// this instance's subscriber sees it on the bus.
    pub async fn publish(&self, client_id: &ClientId, message: &str) -> Result<(), RelayError> {
        let payload = RelayEnvelope::new(client_id, message).encode()?;
        self.bus.publish(&self.channel, payload).await?;

        tracing::debug!("Relayed message for '{}' on '{}'", client_id, self.channel);
        Ok(())
    }
}
