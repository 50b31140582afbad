//! HTTP API request and response DTOs.

use serde::{Deserialize, Serialize};

/// Query of `GET /info`
#[derive(Debug, Clone, Deserialize)]
pub struct InfoQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub message: String,
}

/// Body of `POST /api/publish`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequestDto {
    pub client_ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponseDto {
    pub message: String,
    pub targets: usize,
    pub accepted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineDto {
    pub online: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    pub session_id: String,
    pub connected_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatsDto {
    pub client_id: String,
    pub count: usize,
    pub exists: bool,
    pub sessions: Vec<SessionDto>,
}
