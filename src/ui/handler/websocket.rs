//! WebSocket connection handler.
//!
//! Each accepted socket gets a fresh connection id and an unbounded outbound
//! channel. A receive task parses incoming envelopes and hands them to the
//! session; a send task drains the channel into the socket. When either side
//! ends, the other is aborted and the session runs the departure flow.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::ClientEvent;

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::generate();
    tracing::info!("accepted connection '{}'", connection_id);
    ws.on_upgrade(|socket| handle_socket(socket, state, connection_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    state
        .session
        .connection_opened(connection_id.clone(), tx)
        .await;

    let (mut sender, mut receiver) = socket.split();

    // Receive task: parse incoming envelopes and dispatch them.
    let recv_session = Arc::clone(&state.session);
    let recv_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("websocket error on '{}': {}", recv_id, e);
                    break;
                }
            };
            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            // Malformed input never takes the connection down.
                            tracing::warn!("dropping malformed message from '{}': {}", recv_id, e);
                            continue;
                        }
                    };
                    recv_session.dispatch(&recv_id, event).await;
                }
                Message::Close(_) => {
                    tracing::info!("connection '{}' requested close", recv_id);
                    break;
                }
                // Ping/pong is handled by the protocol layer.
                _ => {}
            }
        }
    });

    // Send task: drain the outbound channel into the socket.
    let send_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(payload.into())).await {
                tracing::debug!("send to '{}' failed: {}", send_id, e);
                break;
            }
        }
    });

    // Whichever task finishes first tears the other down.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    state.session.connection_closed(&connection_id).await;
    tracing::info!("connection '{}' closed", connection_id);
}
