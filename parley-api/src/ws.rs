//! WebSocket live channels
//!
//! Each connection on `/ws/:user_id` binds itself as the live channel of
//! `user_id`. Pushes from the router land in a bounded queue drained by the
//! socket loop; inbound `send_message` frames go through the same router
//! as `/send_message`, with the socket's endpoint as sender.

use crate::state::AppState;
use crate::types::{ClientFrame, ServerFrame};
use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use parley_core::relay::{EndpointId, LiveEvent, LiveHandle, PushError};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Live handle backed by a socket's outbound queue
pub struct WsHandle {
    endpoint: EndpointId,
    tx: mpsc::Sender<LiveEvent>,
}

impl WsHandle {
    pub fn new(endpoint: EndpointId, tx: mpsc::Sender<LiveEvent>) -> Self {
        Self { endpoint, tx }
    }
}

#[async_trait]
impl LiveHandle for WsHandle {
    async fn push(&self, event: LiveEvent) -> Result<(), PushError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => PushError::BufferFull(self.endpoint.clone()),
            TrySendError::Closed(_) => PushError::ChannelClosed(self.endpoint.clone()),
        })
    }
}

/// GET /ws/:user_id - Upgrade to a live channel
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, EndpointId::from(user_id), state))
}

async fn handle_socket(mut socket: WebSocket, endpoint: EndpointId, state: Arc<AppState>) {
    let (tx, mut rx) = mpsc::channel(state.live_channel_capacity);
    let handle = Arc::new(WsHandle::new(endpoint.clone(), tx));
    let token = state.router.bind(endpoint.clone(), handle).await;
    let mut shutdown_rx = state.shutdown.subscribe();

    info!(endpoint = %endpoint, "live channel opened");

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    // Binding replaced by a newer connection
                    debug!(endpoint = %endpoint, "live channel displaced");
                    let _ = socket.send(WsMessage::Close(None)).await;
                    break;
                };
                let frame = ServerFrame::NewMessage {
                    sender: event.sender.to_string(),
                    body: event.body,
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        let reply = handle_client_text(&state, &endpoint, &text).await;
                        if send_frame(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        if socket.send(WsMessage::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(endpoint = %endpoint, error = %e, "websocket receive failed");
                        break;
                    }
                    _ => {}
                }
            }
            _ = shutdown_rx.recv() => {
                let _ = socket.send(WsMessage::Close(None)).await;
                break;
            }
        }
    }

    state.router.unbind_if_current(&endpoint, token).await;
    info!(endpoint = %endpoint, "live channel closed");
}

async fn handle_client_text(state: &AppState, endpoint: &EndpointId, text: &str) -> ServerFrame {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => return ServerFrame::Error { error: format!("Invalid frame: {}", e) },
    };

    match frame {
        ClientFrame::SendMessage { receiver_id, message } => {
            match state.router.send(endpoint.clone(), receiver_id, message).await {
                Ok(data) => ServerFrame::MessageSent { data },
                Err(e) => ServerFrame::Error { error: e.to_string() },
            }
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(json) => socket.send(WsMessage::Text(json)).await,
        Err(e) => {
            warn!(error = %e, "failed to encode frame");
            Ok(())
        }
    }
}
