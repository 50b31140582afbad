//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    domain::ClientId,
    infrastructure::dto::http::{
        ClientStatsDto, InfoQuery, OnlineDto, PublishRequestDto, PublishResponseDto,
    },
    ui::state::AppState,
};

/// `GET /info?userId=..&message=..`: publish to one client id and echo the message
pub async fn send_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InfoQuery>,
) -> String {
    state
        .publish_message_usecase
        .execute(&ClientId::from(query.user_id), query.message)
        .await
}

/// `POST /api/publish`: publish one message to several client ids
pub async fn publish_messages(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequestDto>,
) -> Json<PublishResponseDto> {
    let client_ids: Vec<ClientId> = request.client_ids.into_iter().map(ClientId::from).collect();
    let accepted = state
        .publish_message_usecase
        .execute_many(&client_ids, &request.message)
        .await;

    Json(PublishResponseDto {
        message: request.message,
        targets: client_ids.len(),
        accepted,
    })
}

/// Total live sessions on this instance
pub async fn get_online(State(state): State<Arc<AppState>>) -> Json<OnlineDto> {
    Json(OnlineDto {
        online: state.get_connection_stats_usecase.online().await,
    })
}

/// Live sessions of one client id on this instance
pub async fn get_client_online(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Json<ClientStatsDto> {
    let stats = state
        .get_connection_stats_usecase
        .for_client(ClientId::from(client_id))
        .await;
    Json(stats.into())
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
