//! Local fan-out to the sessions held by this instance.

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRepository};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

pub struct LocalDispatcher {
    repository: Arc<dyn ConnectionRepository>,
}

impl LocalDispatcher {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// Send `message` to every local session of `client_id`.
    ///
    /// Unknown or disconnected client ids are a silent no-op. A failed send
    /// is logged and counted; the remaining sessions still receive the
    /// message. No retry.
    pub async fn deliver_local(&self, client_id: &ClientId, message: &str) -> DeliveryReport {
        // Snapshot: the registry lock is released before any send.
        let sessions = self.repository.lookup(client_id).await;
        if sessions.is_empty() {
            tracing::debug!("No local session for '{}', message dropped", client_id);
            return DeliveryReport::default();
        }

        let mut report = DeliveryReport::default();
        for session in &sessions {
            match session.send(message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to deliver message to '{}': {}", client_id, e);
                }
            }
        }

        tracing::info!(
            "Delivered message to '{}' ({} ok, {} failed): {}",
            client_id,
            report.delivered,
            report.failed,
            message
        );

        report
    }
}
