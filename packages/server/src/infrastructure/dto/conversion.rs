//! Conversion logic between DTOs and domain models.

use dengon_shared::time::timestamp_to_rfc3339;

use crate::{domain::Session, usecase::ClientStats};

use super::http::{ClientStatsDto, SessionDto};

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            connected_at: timestamp_to_rfc3339(session.connected_at().value()),
        }
    }
}

impl From<ClientStats> for ClientStatsDto {
    fn from(stats: ClientStats) -> Self {
        let mut sessions: Vec<SessionDto> = stats.sessions.iter().map(SessionDto::from).collect();
        // Oldest first, for consistent ordering
        sessions.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));

        Self {
            count: stats.count(),
            client_id: stats.client_id.into_string(),
            exists: stats.exists,
            sessions,
        }
    }
}
