//! Message-push interface: how the session reaches connected clients.
//!
//! Fan-out is best-effort per connection. A failure delivering to one
//! connection never prevents delivery to the others; there is no retry and
//! no ordering guarantee across different connections.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::player::ConnectionId;

/// Per-connection outbound channel; the transport layer drains it into the
/// actual socket.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    #[error("failed to push to connection '{0}': {1}")]
    PushFailed(String, String),
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a freshly accepted connection.
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop a closed connection from the registry.
    async fn unregister(&self, connection_id: &ConnectionId);

    /// Push a payload to a single connection.
    async fn push_to(&self, connection_id: &ConnectionId, content: &str)
    -> Result<(), PushError>;

    /// Push a payload to each target independently, tolerating per-target
    /// failures.
    async fn broadcast(&self, targets: &[ConnectionId], content: &str);
}
