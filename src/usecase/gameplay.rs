//! In-game traffic: dice, card draws, snapshot relays, payments, chat,
//! cursors and jail exits.
//!
//! The server is authoritative for randomness and money transfers only;
//! positions and property ownership arrive in client snapshots and are
//! applied as-is. Messages from connections that never joined are dropped.

use rand::Rng;

use crate::common::time::clock_time;
use crate::domain::{Card, ConnectionId, PlayerSnapshot};
use crate::infrastructure::dto::websocket::{
    ChorchResultPayload, DiceRollResultPayload, MemberUpdatingPayload, PlayerUpdatePayload,
    ServerEvent, TurnFinishedPayload, UnjailOption, turn_field,
};
use crate::usecase::session::GameSession;

/// One uniform draw. Decks are never exhausted; every draw sees the full
/// deck, matching the physical "shuffle the card back under" behavior.
fn draw_from(deck: &[Card]) -> Card {
    deck[rand::rng().random_range(0..deck.len())].clone()
}

impl GameSession {
    /// Roll two dice and broadcast the result with a projected board
    /// position. The actual move still arrives later as a player update.
    pub(crate) async fn handle_roll_dice(&self, id: &ConnectionId) {
        let (payload, targets) = {
            let mut room = self.room.lock().await;
            let Some(position) = room.position_of(id) else {
                return;
            };
            let mut rng = rand::rng();
            let first: u8 = rng.random_range(1..=6);
            let second: u8 = rng.random_range(1..=6);
            let projected = ((u16::from(position) + u16::from(first) + u16::from(second)) % 40) as u8;
            if let Some(username) = room.username_of(id) {
                room.push_log(format!(
                    "{{{}}} [{}] \"{}\" rolled a [{},{}]",
                    clock_time(),
                    id,
                    username,
                    first,
                    second
                ));
            }
            (
                DiceRollResultPayload {
                    list_of_nums: [first, second, projected],
                    turn_id: turn_field(room.current_turn()),
                },
                room.member_ids(),
            )
        };

        self.broadcast(&targets, &ServerEvent::DiceRollResult(payload))
            .await;
    }

    /// Draw a chance or community-chest card and broadcast it verbatim; the
    /// clients interpret the card's effect themselves.
    pub(crate) async fn handle_chorch_roll(&self, id: &ConnectionId, is_chance: bool, rolls: u32) {
        let (payload, targets) = {
            let room = self.room.lock().await;
            if !room.contains(id) {
                return;
            }
            (
                ChorchResultPayload {
                    element: draw_from(self.content.deck(is_chance)),
                    is_chance,
                    rolls,
                    turn_id: turn_field(room.current_turn()),
                },
                room.member_ids(),
            )
        };

        self.broadcast(&targets, &ServerEvent::ChorchResult(payload))
            .await;
    }

    /// Apply a client-submitted snapshot to the named member and relay it to
    /// everyone else. The sender vouches for the content; only the identity
    /// fields are protected.
    pub(crate) async fn handle_player_update(
        &self,
        id: &ConnectionId,
        target: &ConnectionId,
        snapshot: &PlayerSnapshot,
    ) {
        let (targets, row) = {
            let mut room = self.room.lock().await;
            if !room.contains(id) || !room.apply_player_update(target, snapshot) {
                return;
            }
            (room.ids_except(target), room.persisted_member(target))
        };

        self.broadcast(
            &targets,
            &ServerEvent::PlayerUpdate(PlayerUpdatePayload {
                player_id: target.clone(),
                p_json: snapshot.clone(),
            }),
        )
        .await;

        if let Some(row) = row {
            self.persist_player(row);
        }
    }

    /// Commit the submitter's end-of-turn snapshot, pass the turn along and
    /// tell the whole room, the submitter included. A non-holder's snapshot
    /// is still applied but the turn stays put and nothing is broadcast.
    pub(crate) async fn handle_finish_turn(&self, id: &ConnectionId, snapshot: &PlayerSnapshot) {
        let (outcome, mode, started, targets, rows) = {
            let mut room = self.room.lock().await;
            let Some(outcome) = room.finish_turn(id, snapshot) else {
                return;
            };
            (
                outcome,
                room.mode().clone(),
                room.started(),
                room.member_ids(),
                room.persisted_players(),
            )
        };

        self.broadcast(
            &targets,
            &ServerEvent::TurnFinished(TurnFinishedPayload {
                from: id.clone(),
                turn_id: turn_field(&outcome.turn_id),
                p_json: outcome.snapshot,
                winning_mode: mode.winning_mode,
            }),
        )
        .await;

        self.persist_room_update(outcome.turn_id, started, Some(mode));
        self.persist_all_players(rows);
    }

    /// Move money between two members and broadcast both updated snapshots
    /// with the receive animation. No sufficiency check is made.
    pub(crate) async fn handle_pay(
        &self,
        id: &ConnectionId,
        amount: i64,
        from: &ConnectionId,
        to: &ConnectionId,
    ) {
        let (outcome, targets, rows) = {
            let mut room = self.room.lock().await;
            if !room.contains(id) {
                return;
            }
            let Some(outcome) = room.transfer(from, to, amount) else {
                return;
            };
            room.push_log(format!(
                "{{{}}} \"{}\" paid \"{}\" ${}",
                clock_time(),
                outcome.payer.username,
                outcome.payee.username,
                amount
            ));
            let rows: Vec<_> = [from, to]
                .into_iter()
                .filter_map(|member| room.persisted_member(member))
                .collect();
            (outcome, room.member_ids(), rows)
        };

        self.broadcast(
            &targets,
            &ServerEvent::MemberUpdating(MemberUpdatingPayload {
                player_id: to.clone(),
                animation: "recieveMoney".to_string(),
                additional_props: vec![from.clone()],
                p_json: vec![outcome.payee, outcome.payer],
            }),
        )
        .await;

        self.persist_all_players(rows);
    }

    /// Relay a chat line under the sender's username.
    pub(crate) async fn handle_message(&self, id: &ConnectionId, message: String) {
        let (from, targets) = {
            let room = self.room.lock().await;
            let Some(from) = room.username_of(id) else {
                return;
            };
            (from, room.member_ids())
        };

        self.broadcast(&targets, &ServerEvent::Message { from, message })
            .await;
    }

    /// Track and relay a member's cursor to everyone else.
    pub(crate) async fn handle_mouse(&self, id: &ConnectionId, x: f64, y: f64) {
        let targets = {
            let mut room = self.room.lock().await;
            if !room.record_cursor(id, x, y) {
                return;
            }
            room.ids_except(id)
        };

        self.broadcast(
            &targets,
            &ServerEvent::Mouse {
                id: id.clone(),
                x,
                y,
            },
        )
        .await;
    }

    /// Relay an opaque history entry to the whole room.
    pub(crate) async fn handle_history(&self, id: &ConnectionId, entry: serde_json::Value) {
        let targets = {
            let room = self.room.lock().await;
            if !room.contains(id) {
                return;
            }
            room.member_ids()
        };

        self.broadcast(&targets, &ServerEvent::History(entry)).await;
    }

    /// Announce how a jailed member chose to get out, to the whole room.
    /// The balance or card deduction arrives separately as a player update.
    pub(crate) async fn handle_unjail(&self, id: &ConnectionId, option: UnjailOption) {
        let targets = {
            let room = self.room.lock().await;
            if !room.contains(id) {
                return;
            }
            room.member_ids()
        };

        self.broadcast(
            &targets,
            &ServerEvent::Unjail {
                to: id.clone(),
                option,
            },
        )
        .await;
    }
}
