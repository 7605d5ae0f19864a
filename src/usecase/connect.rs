//! Join and rejoin flows.

use crate::common::time::clock_time;
use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::{
    InitialsPayload, PlayerRejoinedPayload, RejoinSuccessPayload, ServerEvent, turn_field,
};
use crate::usecase::error::RejoinError;
use crate::usecase::session::GameSession;

impl GameSession {
    /// Admit a connection under a username. Duplicate usernames are accepted;
    /// a connection that already joined is ignored.
    pub(crate) async fn handle_join(&self, id: &ConnectionId, username: &str) {
        let (outcome, mode, started, targets, row) = {
            let mut room = self.room.lock().await;
            if room.contains(id) {
                return;
            }
            let outcome = room.join(id.clone(), username);
            room.push_log(format!(
                "{{{}}} [{}] Player \"{}\" has connected.",
                clock_time(),
                id,
                username
            ));
            (
                outcome,
                room.mode().clone(),
                room.started(),
                room.ids_except(id),
                room.persisted_member(id),
            )
        };
        tracing::info!("player '{}' joined as connection '{}'", username, id);

        // The roster handed back includes the joiner's own record; clients
        // key the list by connection id themselves.
        self.send(
            id,
            &ServerEvent::Initials(InitialsPayload {
                turn_id: turn_field(&outcome.turn_id),
                other_players: outcome.roster.clone(),
                selected_mode: mode,
            }),
        )
        .await;
        self.broadcast(&targets, &ServerEvent::NewPlayer(outcome.snapshot.clone()))
            .await;

        if let Some(row) = row {
            self.persist_player(row);
        }
        self.persist_room_update(outcome.turn_id, started, None);
    }

    /// Restore a persisted identity onto this connection. Failures are
    /// answered on the requesting socket only.
    pub(crate) async fn handle_rejoin(&self, id: &ConnectionId, username: &str) {
        match self.try_rejoin(id, username).await {
            Ok(()) => {}
            Err(RejoinError::PlayerNotFound) => {
                tracing::warn!("rejoin refused for '{}': no persisted identity", username);
                self.send(
                    id,
                    &ServerEvent::RejoinFailed {
                        reason: "Player not found in this game".to_string(),
                    },
                )
                .await;
            }
            Err(RejoinError::Gateway(e)) => {
                tracing::error!("rejoin lookup for '{}' failed: {}", username, e);
                self.send(
                    id,
                    &ServerEvent::RejoinFailed {
                        reason: "Error during rejoin".to_string(),
                    },
                )
                .await;
            }
        }
    }

    async fn try_rejoin(&self, id: &ConnectionId, username: &str) -> Result<(), RejoinError> {
        let binding = self.binding.as_ref().ok_or(RejoinError::PlayerNotFound)?;
        let persisted = self
            .gateway
            .find_player_by_username(binding, username)
            .await?
            .ok_or(RejoinError::PlayerNotFound)?;

        let (outcome, mode, started, targets) = {
            let mut room = self.room.lock().await;
            if room.contains(id) {
                return Ok(());
            }
            let outcome = room.admit_rejoined(id.clone(), &persisted);
            room.push_log(format!(
                "{{{}}} [{}] Player \"{}\" has rejoined.",
                clock_time(),
                id,
                username
            ));
            (
                outcome,
                room.mode().clone(),
                room.started(),
                room.ids_except(id),
            )
        };
        tracing::info!(
            "player '{}' rejoined: connection '{}' replaces '{}'",
            username,
            id,
            outcome.old_id
        );

        self.send(
            id,
            &ServerEvent::RejoinSuccess(RejoinSuccessPayload {
                turn_id: turn_field(&outcome.turn_id),
                other_players: outcome.roster.clone(),
                selected_mode: mode,
                game_started: started,
                my_player: outcome.snapshot.clone(),
            }),
        )
        .await;
        self.broadcast(
            &targets,
            &ServerEvent::PlayerRejoined(PlayerRejoinedPayload {
                player: outcome.snapshot,
                new_peer_id: id.clone(),
                old_peer_id: outcome.old_id,
            }),
        )
        .await;

        self.persist_rebind(username.to_string(), id.as_str().to_string());
        self.persist_room_update(outcome.turn_id, started, None);
        Ok(())
    }
}
