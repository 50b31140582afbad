//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    BroadcastClientMessageUseCase, ConnectSessionUseCase, DisconnectSessionUseCase,
    GetConnectionStatsUseCase, PublishMessageUseCase,
};

pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// BroadcastClientMessageUseCase（クライアント発言のローカル配信）
    pub broadcast_client_message_usecase: Arc<BroadcastClientMessageUseCase>,
    /// PublishMessageUseCase（外部トリガーからの配信）
    pub publish_message_usecase: Arc<PublishMessageUseCase>,
    /// GetConnectionStatsUseCase（接続数の取得）
    pub get_connection_stats_usecase: Arc<GetConnectionStatsUseCase>,
    /// Sessions silent for this long are closed
    pub idle_timeout: Duration,
}
