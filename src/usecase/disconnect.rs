//! Departure flow.
//!
//! The in-memory member record is dropped but the persisted row is only
//! flagged as disconnected, so the identity stays claimable through rejoin.
//! A socket that never joined leaves silently.

use crate::common::time::clock_time;
use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::{ServerEvent, turn_field};
use crate::usecase::session::GameSession;

impl GameSession {
    pub(crate) async fn handle_disconnect(&self, id: &ConnectionId) {
        let (outcome, targets, started) = {
            let mut room = self.room.lock().await;
            let Some(outcome) = room.remove(id) else {
                return;
            };
            room.push_log(format!(
                "{{{}}} [{}] Player \"{}\" has disconnected.",
                clock_time(),
                id,
                outcome.username
            ));
            if outcome.emptied {
                room.push_log(format!(
                    "{{{}}} Game has Ended. Server is currently open to new players",
                    clock_time()
                ));
            }
            (outcome, room.member_ids(), room.started())
        };
        tracing::info!("player '{}' disconnected", outcome.username);
        if outcome.emptied {
            tracing::info!("room is empty; back to the lobby");
        }

        self.broadcast(
            &targets,
            &ServerEvent::DisconnectedPlayer {
                id: id.clone(),
                turn: turn_field(&outcome.turn_id),
            },
        )
        .await;

        self.persist_disconnect(id.as_str().to_string());
        self.persist_room_update(outcome.turn_id, started, None);
    }
}
