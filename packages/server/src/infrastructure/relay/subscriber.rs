//! Relay subscriber: the background task that turns bus messages into local
//! deliveries.
//!
//! It only ever talks to the [`LocalDispatcher`]. It holds no publisher, so
//! a received message can never be re-published.

use std::{sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio::{sync::oneshot, task::JoinHandle};

use crate::domain::{BusError, BusStream, EnvelopeError, MessageBus, RelayEnvelope};

use super::{DeliveryReport, LocalDispatcher};

const RESUBSCRIBE_INTERVAL: Duration = Duration::from_secs(5);

pub struct RelaySubscriber {
    bus: Arc<dyn MessageBus>,
    channel: String,
    dispatcher: Arc<LocalDispatcher>,
}

impl RelaySubscriber {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        channel: impl Into<String>,
        dispatcher: Arc<LocalDispatcher>,
    ) -> Self {
        Self {
            bus,
            channel: channel.into(),
            dispatcher,
        }
    }

    /// Decode one raw bus message and deliver it locally.
    ///
    /// Malformed or empty messages are logged and dropped (`None`).
    pub async fn handle_message(&self, raw: &[u8]) -> Option<DeliveryReport> {
        let envelope = match RelayEnvelope::decode(raw) {
            Ok(envelope) => envelope,
            Err(EnvelopeError::Empty) => {
                tracing::info!("Empty relay message on '{}', skipped", self.channel);
                return None;
            }
            Err(e) => {
                tracing::error!("Dropping relay message on '{}': {}", self.channel, e);
                return None;
            }
        };

        let report = self
            .dispatcher
            .deliver_local(&envelope.target_client_id(), &envelope.payload)
            .await;
        Some(report)
    }

    /// Subscribe and spawn the listener task.
    ///
    /// The initial subscription error is returned to the caller. Later, if
    /// the bus stream ends, the task resubscribes until it is shut down.
    pub async fn start(self: Arc<Self>) -> Result<RelaySubscriberHandle, BusError> {
        let stream = self.bus.subscribe(&self.channel).await?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!("Relay subscriber listening on '{}'", self.channel);
        let task = tokio::spawn(self.run(stream, shutdown_rx));

        Ok(RelaySubscriberHandle {
            shutdown: shutdown_tx,
            task,
        })
    }

    async fn run(self: Arc<Self>, mut stream: BusStream, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                next = stream.next() => match next {
                    Some(raw) => {
                        self.handle_message(&raw).await;
                    }
                    None => {
                        tracing::warn!("Relay stream on '{}' ended, resubscribing", self.channel);
                        match self.resubscribe(&mut shutdown).await {
                            Some(resubscribed) => stream = resubscribed,
                            None => break,
                        }
                    }
                },
            }
        }
        tracing::info!("Relay subscriber on '{}' stopped", self.channel);
    }

    /// Retry until subscribed again; `None` if shut down meanwhile.
    async fn resubscribe(&self, shutdown: &mut oneshot::Receiver<()>) -> Option<BusStream> {
        loop {
            tokio::select! {
                _ = &mut *shutdown => return None,
                _ = tokio::time::sleep(RESUBSCRIBE_INTERVAL) => {}
            }
            match self.bus.subscribe(&self.channel).await {
                Ok(stream) => {
                    tracing::info!("Resubscribed to '{}'", self.channel);
                    return Some(stream);
                }
                Err(e) => tracing::warn!("Resubscribe failed: {}", e),
            }
        }
    }
}

/// Stops the listener task.
pub struct RelaySubscriberHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RelaySubscriberHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Relay subscriber task failed: {}", e);
        }
    }
}
