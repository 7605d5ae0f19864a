//! WebSocket-backed message pusher.
//!
//! Owns the map of live connections to their outbound channels. Socket
//! creation happens in the UI layer; this type only delivers payloads into
//! the per-connection senders.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, PushError, PusherChannel};

pub struct WebSocketMessagePusher {
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("connection '{}' registered to pusher", connection_id);
        connections.insert(connection_id, sender);
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!("connection '{}' unregistered from pusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), PushError> {
        let connections = self.connections.lock().await;
        let sender = connections.get(connection_id).ok_or_else(|| {
            PushError::ConnectionNotFound(connection_id.as_str().to_string())
        })?;
        sender.send(content.to_string()).map_err(|e| {
            PushError::PushFailed(connection_id.as_str().to_string(), e.to_string())
        })
    }

    async fn broadcast(&self, targets: &[ConnectionId], content: &str) {
        let connections = self.connections.lock().await;
        for target in targets {
            match connections.get(target) {
                Some(sender) => {
                    // Each send is independent; one dead connection must not
                    // block the rest.
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("failed to push to connection '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("connection '{}' not found during broadcast, skipping", target);
                }
            }
        }
    }
}
