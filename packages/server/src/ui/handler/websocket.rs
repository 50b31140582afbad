//! WebSocket connection handlers.
//!
//! Each connection runs two tasks: the receive loop (client frames, idle
//! timeout) and the pusher loop (session channel -> socket). Traffic in
//! either direction resets the idle timer. When the receive loop ends first,
//! the pusher writes the Close frame before exiting; when the pusher ends
//! first, the receive loop is aborted.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use super::activity::Activity;
use crate::{
    domain::{ClientId, Session},
    ui::state::AppState,
    usecase::DisconnectReason,
};

/// How long the pusher gets to write the Close frame before it is aborted.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// `GET /websocket/{client_id}`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, ClientId::from(client_id)))
}

/// Forward messages pushed to the session into the WebSocket.
///
/// Ends when the socket refuses a write, or after writing the Close frame
/// received on `close`.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    mut close: oneshot::Receiver<CloseFrame>,
    activity: Arc<Activity>,
) -> tokio::task::JoinHandle<DisconnectReason> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        return DisconnectReason::Closed;
                    };
                    if let Err(e) = sender.send(Message::Text(msg.into())).await {
                        return DisconnectReason::Error(e.to_string());
                    }
                    activity.touch();
                }
                frame = &mut close => {
                    // Fails harmlessly when the peer already started the
                    // handshake; `close` still flushes our reply.
                    if let Err(e) = sender.send(Message::Close(frame.ok())).await {
                        tracing::debug!("Close frame not sent: {}", e);
                    }
                    if let Err(e) = sender.close().await {
                        tracing::debug!("Socket close failed: {}", e);
                    }
                    return DisconnectReason::Closed;
                }
            }
        }
    })
}

/// Read client frames until close, error or idle timeout.
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session: Session,
    activity: Arc<Activity>,
) -> DisconnectReason {
    loop {
        let deadline = activity.deadline(state.idle_timeout);
        let next = match tokio::time::timeout_at(deadline, receiver.next()).await {
            Ok(next) => next,
            // Pushes may have moved the deadline while we waited.
            Err(_) if activity.is_idle(state.idle_timeout) => {
                return DisconnectReason::IdleTimeout;
            }
            Err(_) => continue,
        };
        activity.touch();

        match next {
            None => return DisconnectReason::Closed,
            Some(Err(e)) => return DisconnectReason::Error(e.to_string()),
            Some(Ok(Message::Text(text))) => {
                state
                    .broadcast_client_message_usecase
                    .execute(&session, text.as_str())
                    .await;
            }
            Some(Ok(Message::Close(_))) => {
                tracing::info!("'{}' requested close", session.client_id());
                return DisconnectReason::Closed;
            }
            Some(Ok(_)) => {
                // Ping/pong is answered by the protocol layer.
                tracing::trace!("Non-text frame from '{}'", session.client_id());
            }
        }
    }
}

fn close_frame(reason: &DisconnectReason) -> CloseFrame {
    // Close reasons are capped at 123 bytes, so errors stay generic.
    let (code, text) = match reason {
        DisconnectReason::Closed => (close_code::NORMAL, "closed"),
        DisconnectReason::IdleTimeout => (close_code::NORMAL, "idle timeout"),
        DisconnectReason::Error(_) => (close_code::ERROR, "error"),
    };
    CloseFrame {
        code,
        reason: text.into(),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, client_id: ClientId) {
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = oneshot::channel();
    let activity = Arc::new(Activity::new());

    // Opening -> Active (registers and sends the welcome into `tx`)
    let session = match state
        .connect_session_usecase
        .execute(client_id.clone(), tx)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Rejecting connection of '{}': {}", client_id, e);
            return;
        }
    };

    let mut send_task = pusher_loop(rx, sender, close_rx, activity.clone());
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        session.clone(),
        activity,
    ));

    let reason = tokio::select! {
        result = &mut recv_task => {
            let reason = result.unwrap_or_else(|e| DisconnectReason::Error(e.to_string()));
            // Let the pusher finish the close handshake
            let _ = close_tx.send(close_frame(&reason));
            if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
                send_task.abort();
            }
            reason
        }
        result = &mut send_task => {
            recv_task.abort();
            result.unwrap_or_else(|e| DisconnectReason::Error(e.to_string()))
        }
    };

    // Active -> Closed
    state
        .disconnect_session_usecase
        .execute(&session, reason)
        .await;
}
