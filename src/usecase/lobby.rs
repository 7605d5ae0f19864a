//! Lobby negotiation: readiness and mode selection.

use crate::common::time::clock_time;
use crate::domain::{ConnectionId, GameMode};
use crate::infrastructure::dto::websocket::{EmptyPayload, ReadyPayload, ServerEvent};
use crate::usecase::session::GameSession;

impl GameSession {
    /// Toggle readiness and/or replace the room mode, then tell everyone.
    /// The evaluation that makes readiness unanimous starts the game.
    pub(crate) async fn handle_ready(
        &self,
        id: &ConnectionId,
        ready: Option<bool>,
        mode: Option<GameMode>,
    ) {
        let (outcome, mode_now, targets, turn, rows) = {
            let mut room = self.room.lock().await;
            let Some(outcome) = room.set_ready(id, ready, mode) else {
                return;
            };
            if outcome.game_started_now {
                room.push_log(format!("{{{}}} Game has Started...", clock_time()));
            }
            (
                outcome,
                room.mode().clone(),
                room.member_ids(),
                room.current_turn().clone(),
                room.persisted_players(),
            )
        };

        self.broadcast(
            &targets,
            &ServerEvent::Ready(ReadyPayload {
                id: id.clone(),
                state: outcome.ready,
                selected_mode: mode_now.clone(),
            }),
        )
        .await;

        if outcome.game_started_now {
            tracing::info!("all members ready; game started");
            self.broadcast(&targets, &ServerEvent::StartGame(EmptyPayload {}))
                .await;
            self.persist_room_update(turn, true, Some(mode_now));
            self.persist_all_players(rows);
        }
    }
}
