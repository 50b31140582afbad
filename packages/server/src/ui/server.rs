//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    BroadcastClientMessageUseCase, ConnectSessionUseCase, DisconnectSessionUseCase,
    GetConnectionStatsUseCase, PublishMessageUseCase,
};

use super::{
    handler::{
        get_client_online, get_online, health_check, publish_messages, send_info,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Push server
///
/// This struct holds the usecases behind the HTTP and WebSocket routes and
/// provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     broadcast_client_message_usecase,
///     publish_message_usecase,
///     get_connection_stats_usecase,
///     Duration::from_secs(600),
/// );
/// server.run("127.0.0.1:8080").await?;
/// ```
pub struct Server {
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    broadcast_client_message_usecase: Arc<BroadcastClientMessageUseCase>,
    publish_message_usecase: Arc<PublishMessageUseCase>,
    get_connection_stats_usecase: Arc<GetConnectionStatsUseCase>,
    idle_timeout: Duration,
}

impl Server {
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        broadcast_client_message_usecase: Arc<BroadcastClientMessageUseCase>,
        publish_message_usecase: Arc<PublishMessageUseCase>,
        get_connection_stats_usecase: Arc<GetConnectionStatsUseCase>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            connect_session_usecase,
            disconnect_session_usecase,
            broadcast_client_message_usecase,
            publish_message_usecase,
            get_connection_stats_usecase,
            idle_timeout,
        }
    }

    /// Build the router with all routes
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            broadcast_client_message_usecase: self.broadcast_client_message_usecase,
            publish_message_usecase: self.publish_message_usecase,
            get_connection_stats_usecase: self.get_connection_stats_usecase,
            idle_timeout: self.idle_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/websocket/{client_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/info", get(send_info))
            .route("/api/publish", post(publish_messages))
            .route("/api/online", get(get_online))
            .route("/api/online/{client_id}", get(get_client_online))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the push server until Ctrl+C / SIGTERM
    ///
    /// # Arguments
    ///
    /// * `bind_addr` - The `host:port` to bind to (e.g., "127.0.0.1:8080")
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        tracing::info!("Push server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/websocket/{{client_id}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
