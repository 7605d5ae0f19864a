//! Session startup: bind the room to its persisted record, or fall back to
//! memory-only when the backend is unavailable.

use std::sync::Arc;

use crate::domain::{ConnectionId, ContentStore, MessagePusher, PersistenceGateway, Room};
use crate::usecase::session::GameSession;

/// Build the session for a room code. A persisted room with the same code is
/// resumed (its members rejoin individually); otherwise a fresh record is
/// created. Gateway failures degrade to a memory-only session instead of
/// refusing to start.
pub async fn bootstrap_session(
    code: &str,
    max_members: usize,
    gateway: Arc<dyn PersistenceGateway>,
    pusher: Arc<dyn MessagePusher>,
    content: Arc<ContentStore>,
) -> GameSession {
    match gateway.find_room(code).await {
        Ok(Some(persisted)) => {
            tracing::info!(
                "resuming room '{}' ({} persisted players, started: {})",
                code,
                persisted.players.len(),
                persisted.game_started
            );
            let mode = persisted
                .selected_mode
                .clone()
                .unwrap_or_else(|| content.default_mode());
            let turn = persisted
                .current_turn_id
                .clone()
                .filter(|id| !id.is_empty())
                .map(ConnectionId::new);
            let room = Room::resumed(code, mode, persisted.game_started, turn, max_members);
            GameSession::new(room, gateway, pusher, content, Some(persisted.id))
        }
        Ok(None) => {
            let mode = content.default_mode();
            let binding = match gateway.create_room(code, &mode).await {
                Ok(Some(id)) => {
                    tracing::info!("created persisted record for room '{}'", code);
                    Some(id)
                }
                Ok(None) => {
                    tracing::warn!("backend declined to create room '{}'; running memory-only", code);
                    None
                }
                Err(e) => {
                    tracing::warn!("persistence unavailable ({}); running memory-only", e);
                    None
                }
            };
            GameSession::new(Room::new(code, mode, max_members), gateway, pusher, content, binding)
        }
        Err(e) => {
            tracing::warn!("persistence unavailable ({}); running memory-only", e);
            let room = Room::new(code, content.default_mode(), max_members);
            GameSession::new(room, gateway, pusher, content, None)
        }
    }
}
