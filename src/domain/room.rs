//! The authoritative session: membership, turn order, ready/mode
//! negotiation, trades and disconnect/rejoin reconciliation.
//!
//! All operations here are synchronous, pure in-memory mutations. They
//! return outcome values describing what happened; the usecase layer turns
//! those into broadcasts and fire-and-forget persistence writes. Handlers
//! run to completion under a single lock, so the room has exactly one
//! writer at a time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::gateway::PersistedPlayer;
use super::mode::GameMode;
use super::player::{ConnectionId, Player, PlayerSnapshot, PropertyToken};

/// Last reported cursor position of a member, relayed to other clients.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// One connected participant.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub player: Player,
    pub ready: bool,
    pub cursor: CursorPosition,
}

/// Advisory room occupancy state pushed to a client on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Room accepts fresh joins.
    Joinable,
    /// Game in progress; only rejoin is useful.
    InProgress,
    /// Room is full.
    Closed,
}

impl RoomPhase {
    /// Wire code: 0 = joinable, 1 = in progress, 2 = full/closed.
    pub fn code(self) -> u8 {
        match self {
            RoomPhase::Joinable => 0,
            RoomPhase::InProgress => 1,
            RoomPhase::Closed => 2,
        }
    }
}

/// One side of a trade proposal: what this party offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSide {
    pub id: ConnectionId,
    pub prop: Vec<PropertyToken>,
    pub balance: i64,
}

/// Two-party trade proposal as submitted by the client that holds the turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    #[serde(rename = "turnPlayer")]
    pub turn_player: TradeSide,
    #[serde(rename = "againstPlayer")]
    pub against_player: TradeSide,
}

#[derive(Debug)]
pub struct JoinOutcome {
    pub snapshot: PlayerSnapshot,
    pub turn_id: Option<ConnectionId>,
    pub roster: Vec<PlayerSnapshot>,
}

#[derive(Debug)]
pub struct RejoinOutcome {
    pub snapshot: PlayerSnapshot,
    pub old_id: ConnectionId,
    pub turn_id: Option<ConnectionId>,
    pub roster: Vec<PlayerSnapshot>,
}

#[derive(Debug)]
pub struct ReadyOutcome {
    pub ready: bool,
    /// True only on the evaluation that flipped the room to started.
    pub game_started_now: bool,
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub snapshot: PlayerSnapshot,
    pub turn_id: Option<ConnectionId>,
}

#[derive(Debug)]
pub struct PaymentOutcome {
    pub payee: PlayerSnapshot,
    pub payer: PlayerSnapshot,
}

#[derive(Debug)]
pub struct TradeOutcome {
    pub initiator: PlayerSnapshot,
    pub respondent: PlayerSnapshot,
    pub summary: String,
}

#[derive(Debug)]
pub struct DepartureOutcome {
    pub username: String,
    pub turn_id: Option<ConnectionId>,
    /// The room became empty and was reset to the lobby.
    pub emptied: bool,
}

/// The authoritative in-memory model of one game room.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    code: String,
    members: HashMap<ConnectionId, Member>,
    /// Join order of the live members; turn rotation walks this.
    join_order: Vec<ConnectionId>,
    current_turn: Option<ConnectionId>,
    started: bool,
    mode: GameMode,
    max_members: usize,
    log: Vec<String>,
}

impl Room {
    pub fn new(code: impl Into<String>, mode: GameMode, max_members: usize) -> Self {
        Self {
            code: code.into(),
            members: HashMap::new(),
            join_order: Vec::new(),
            current_turn: None,
            started: false,
            mode,
            max_members,
            log: Vec::new(),
        }
    }

    /// Rebuild a room from its persisted state. The member set starts empty
    /// regardless; clients rejoin individually.
    pub fn resumed(
        code: impl Into<String>,
        mode: GameMode,
        started: bool,
        current_turn: Option<ConnectionId>,
        max_members: usize,
    ) -> Self {
        let mut room = Self::new(code, mode, max_members);
        room.started = started;
        room.current_turn = current_turn;
        room
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn current_turn(&self) -> &Option<ConnectionId> {
        &self.current_turn
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn phase(&self) -> RoomPhase {
        if self.started {
            RoomPhase::InProgress
        } else if self.members.len() < self.max_members {
            RoomPhase::Joinable
        } else {
            RoomPhase::Closed
        }
    }

    /// Live member ids in join order.
    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.join_order.clone()
    }

    /// Live member ids in join order, excluding one connection.
    pub fn ids_except(&self, excluded: &ConnectionId) -> Vec<ConnectionId> {
        self.join_order
            .iter()
            .filter(|id| *id != excluded)
            .cloned()
            .collect()
    }

    /// Snapshots of every member in join order (the joiner included).
    pub fn roster(&self) -> Vec<PlayerSnapshot> {
        self.join_order
            .iter()
            .filter_map(|id| self.members.get(id))
            .map(|member| member.player.to_snapshot())
            .collect()
    }

    pub fn username_of(&self, id: &ConnectionId) -> Option<String> {
        self.members
            .get(id)
            .map(|member| member.player.username.clone())
    }

    pub fn position_of(&self, id: &ConnectionId) -> Option<u8> {
        self.members.get(id).map(|member| member.player.position)
    }

    /// Durable rows for every live member.
    pub fn persisted_players(&self) -> Vec<PersistedPlayer> {
        self.join_order
            .iter()
            .filter_map(|id| self.members.get(id))
            .map(|member| PersistedPlayer::from_snapshot(&member.player.to_snapshot(), member.ready))
            .collect()
    }

    pub fn persisted_member(&self, id: &ConnectionId) -> Option<PersistedPlayer> {
        self.members
            .get(id)
            .map(|member| PersistedPlayer::from_snapshot(&member.player.to_snapshot(), member.ready))
    }

    pub fn push_log(&mut self, line: String) {
        self.log.push(line);
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Admit a new member. Duplicate usernames are not rejected: the map is
    /// keyed by connection id, and two connections may share a username
    /// until one of them goes through a rejoin lookup.
    pub fn join(&mut self, id: ConnectionId, username: &str) -> JoinOutcome {
        let icon = self.members.len();
        let player = Player::new(id.clone(), username, icon, self.mode.starting_cash);
        let snapshot = player.to_snapshot();

        // Turn assignment: the joiner takes the turn when nobody holds it
        // or the previous holder is gone.
        let turn_is_stale = match &self.current_turn {
            None => true,
            Some(holder) => !self.members.contains_key(holder),
        };
        if turn_is_stale {
            self.current_turn = Some(id.clone());
        }

        self.members.insert(
            id.clone(),
            Member {
                player,
                ready: false,
                cursor: CursorPosition::default(),
            },
        );
        self.join_order.push(id);

        JoinOutcome {
            snapshot,
            turn_id: self.current_turn.clone(),
            roster: self.roster(),
        }
    }

    /// Re-admit a returning identity under a new connection id, restoring
    /// the persisted mutable fields. If the old connection id held the turn,
    /// the turn pointer is remapped to the new one.
    pub fn admit_rejoined(&mut self, id: ConnectionId, persisted: &PersistedPlayer) -> RejoinOutcome {
        let old_id = ConnectionId::new(persisted.peer_id.clone());

        let mut player = Player::new(id.clone(), &persisted.username, persisted.icon, persisted.balance);
        player.position = persisted.position;
        player.properties = persisted.properties.clone();
        player.is_in_jail = persisted.is_in_jail;
        player.jail_turns_remaining = persisted.jail_turns;
        player.getout_cards = persisted.getout_cards;
        let snapshot = player.to_snapshot();

        if self.current_turn.as_ref() == Some(&old_id) {
            self.current_turn = Some(id.clone());
        }

        self.members.insert(
            id.clone(),
            Member {
                player,
                ready: persisted.is_ready,
                cursor: CursorPosition::default(),
            },
        );
        self.join_order.push(id);

        RejoinOutcome {
            snapshot,
            old_id,
            turn_id: self.current_turn.clone(),
            roster: self.roster(),
        }
    }

    /// Toggle a member's ready flag and/or replace the room mode. Mode
    /// changes are ignored once the game has started. Returns `None` for an
    /// unknown connection (stale message, dropped silently).
    ///
    /// The room starts exactly when every member present at this evaluation
    /// is ready; there is no quorum and no timeout.
    pub fn set_ready(
        &mut self,
        id: &ConnectionId,
        ready: Option<bool>,
        mode: Option<GameMode>,
    ) -> Option<ReadyOutcome> {
        let now_ready = {
            let member = self.members.get_mut(id)?;
            if let Some(flag) = ready {
                member.ready = flag;
            }
            member.ready
        };

        if let Some(mode) = mode
            && !self.started
        {
            self.mode = mode;
        }

        let all_ready = !self.members.is_empty() && self.members.values().all(|m| m.ready);
        let game_started_now = all_ready && !self.started;
        if game_started_now {
            self.started = true;
        }

        Some(ReadyOutcome {
            ready: now_ready,
            game_started_now,
        })
    }

    /// Apply a client-submitted snapshot to the named member. Returns false
    /// for an unknown target (stale message). The snapshot itself is still
    /// identity-gated inside [`Player::apply_snapshot`].
    pub fn apply_player_update(&mut self, target: &ConnectionId, snapshot: &PlayerSnapshot) -> bool {
        match self.members.get_mut(target) {
            Some(member) => {
                member.player.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Apply the submitter's final snapshot, then advance the turn — but
    /// only if the submitter actually holds it. The next holder is the next
    /// member with positive balance in join order, wrapping; members with a
    /// non-positive balance are skipped as eliminated but stay in the room.
    pub fn finish_turn(
        &mut self,
        id: &ConnectionId,
        snapshot: &PlayerSnapshot,
    ) -> Option<TurnOutcome> {
        let member = self.members.get_mut(id)?;
        member.player.apply_snapshot(snapshot);
        let applied = member.player.to_snapshot();

        if self.current_turn.as_ref() != Some(id) {
            return None;
        }

        let position = self.join_order.iter().position(|c| c == id)?;
        self.current_turn = self.next_eligible_from((position + 1) % self.join_order.len());

        Some(TurnOutcome {
            snapshot: applied,
            turn_id: self.current_turn.clone(),
        })
    }

    /// Transfer an integer amount between two members. No sufficiency check:
    /// a negative payer balance is a legal transient state. If either party
    /// is missing, nothing is mutated.
    pub fn transfer(
        &mut self,
        from: &ConnectionId,
        to: &ConnectionId,
        amount: i64,
    ) -> Option<PaymentOutcome> {
        if !self.members.contains_key(from) || !self.members.contains_key(to) {
            return None;
        }
        self.members.get_mut(to)?.player.balance += amount;
        self.members.get_mut(from)?.player.balance -= amount;

        Some(PaymentOutcome {
            payee: self.members.get(to)?.player.to_snapshot(),
            payer: self.members.get(from)?.player.to_snapshot(),
        })
    }

    /// Atomic two-party exchange: each side loses exactly the tokens it
    /// offered and receives exactly the tokens the counter-party offered,
    /// and each balance is adjusted by the counter-party's offered amount.
    /// Ownership of the offered tokens is not validated (accepted gap; the
    /// client UI is the gatekeeper).
    pub fn execute_trade(&mut self, proposal: &TradeProposal) -> Option<TradeOutcome> {
        let a = proposal.turn_player.id.clone();
        let b = proposal.against_player.id.clone();
        if a == b || !self.members.contains_key(&a) || !self.members.contains_key(&b) {
            return None;
        }

        {
            let player = &mut self.members.get_mut(&a)?.player;
            player.properties.retain(|token| !proposal.turn_player.prop.contains(token));
            player.properties.extend(proposal.against_player.prop.iter().cloned());
            player.balance += proposal.against_player.balance - proposal.turn_player.balance;
        }
        {
            let player = &mut self.members.get_mut(&b)?.player;
            player.properties.retain(|token| !proposal.against_player.prop.contains(token));
            player.properties.extend(proposal.turn_player.prop.iter().cloned());
            player.balance += proposal.turn_player.balance - proposal.against_player.balance;
        }

        let initiator = self.members.get(&a)?.player.to_snapshot();
        let respondent = self.members.get(&b)?.player.to_snapshot();
        let summary = format!(
            "{} done a trade with {}",
            initiator.username, respondent.username
        );

        Some(TradeOutcome {
            initiator,
            respondent,
            summary,
        })
    }

    pub fn record_cursor(&mut self, id: &ConnectionId, x: f64, y: f64) -> bool {
        match self.members.get_mut(id) {
            Some(member) => {
                member.cursor = CursorPosition { x, y };
                true
            }
            None => false,
        }
    }

    /// Remove a departing member. If they held the turn, it advances to the
    /// next eligible member from their former seat. The record is only
    /// removed from memory; the persisted row stays for a later rejoin.
    /// A fully vacated room drops back to the lobby.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<DepartureOutcome> {
        let member = self.members.remove(id)?;
        let seat = self.join_order.iter().position(|c| c == id).unwrap_or(0);
        self.join_order.retain(|c| c != id);

        if self.current_turn.as_ref() == Some(id) {
            self.current_turn = if self.join_order.is_empty() {
                None
            } else {
                self.next_eligible_from(seat % self.join_order.len())
            };
        }

        let emptied = self.members.is_empty();
        if emptied {
            self.started = false;
        }

        Some(DepartureOutcome {
            username: member.player.username,
            turn_id: self.current_turn.clone(),
            emptied,
        })
    }

    /// First member with positive balance at or after `start` in join order,
    /// wrapping once around. `None` when nobody qualifies.
    fn next_eligible_from(&self, start: usize) -> Option<ConnectionId> {
        let len = self.join_order.len();
        for offset in 0..len {
            let id = &self.join_order[(start + offset) % len];
            if let Some(member) = self.members.get(id)
                && member.player.balance > 0
            {
                return Some(id.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn classic() -> GameMode {
        GameMode {
            name: "Classic".to_string(),
            starting_cash: 1500,
            allow_deals: true,
            winning_mode: super::super::mode::WinningMode::LastStanding,
        }
    }

    fn conn(raw: &str) -> ConnectionId {
        ConnectionId::new(raw)
    }

    fn room_with(members: &[(&str, &str)]) -> Room {
        let mut room = Room::new("TEST01", classic(), 6);
        for (id, name) in members {
            room.join(conn(id), name);
        }
        room
    }

    fn balance_of(room: &Room, id: &str) -> i64 {
        room.roster()
            .into_iter()
            .find(|p| p.id == conn(id))
            .unwrap()
            .balance
    }

    fn set_balance(room: &mut Room, id: &str, balance: i64) {
        let target = conn(id);
        let mut snapshot = room
            .roster()
            .into_iter()
            .find(|p| p.id == target)
            .unwrap();
        snapshot.balance = balance;
        assert!(room.apply_player_update(&target, &snapshot));
    }

    #[test]
    fn test_join_assigns_icon_ordinals_and_starting_cash() {
        // given (precondition): an empty classic room
        let mut room = Room::new("TEST01", classic(), 6);

        // when (operation): three players join
        let a = room.join(conn("a"), "alice");
        let b = room.join(conn("b"), "bob");
        let c = room.join(conn("c"), "carol");

        // then (expected result): ordinal icons, preset cash
        assert_eq!(a.snapshot.icon, 0);
        assert_eq!(b.snapshot.icon, 1);
        assert_eq!(c.snapshot.icon, 2);
        assert!(room.roster().iter().all(|p| p.balance == 1500));
    }

    #[test]
    fn test_first_joiner_takes_the_turn_and_keeps_it() {
        let mut room = Room::new("TEST01", classic(), 6);

        let first = room.join(conn("a"), "alice");
        let second = room.join(conn("b"), "bob");

        assert_eq!(first.turn_id, Some(conn("a")));
        assert_eq!(second.turn_id, Some(conn("a")));
    }

    #[test]
    fn test_stale_turn_is_reassigned_to_the_next_joiner() {
        // given (precondition): the turn holder departed
        let mut room = room_with(&[("a", "alice")]);
        room.remove(&conn("a"));
        assert_eq!(*room.current_turn(), None);

        // when (operation):
        let joined = room.join(conn("b"), "bob");

        // then (expected result): the joiner takes the turn
        assert_eq!(joined.turn_id, Some(conn("b")));
    }

    #[test]
    fn test_roster_preserves_join_order() {
        let room = room_with(&[("c", "carol"), ("a", "alice"), ("b", "bob")]);

        let roster = room.roster();
        let names: Vec<&str> = roster.iter().map(|p| p.username.as_str()).collect();

        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_start_requires_unanimous_readiness() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);

        let first = room.set_ready(&conn("a"), Some(true), None).unwrap();
        assert!(!first.game_started_now);
        assert!(!room.started());

        let second = room.set_ready(&conn("b"), Some(true), None).unwrap();
        assert!(second.game_started_now);
        assert!(room.started());
    }

    #[test]
    fn test_start_fires_exactly_once() {
        let mut room = room_with(&[("a", "alice")]);
        assert!(room.set_ready(&conn("a"), Some(true), None).unwrap().game_started_now);

        // A redundant ready toggle after the start must not re-fire.
        let again = room.set_ready(&conn("a"), Some(true), None).unwrap();

        assert!(!again.game_started_now);
        assert!(room.started());
    }

    #[test]
    fn test_ready_for_unknown_connection_is_dropped() {
        let mut room = room_with(&[("a", "alice")]);

        assert!(room.set_ready(&conn("ghost"), Some(true), None).is_none());
        assert!(!room.started());
    }

    #[test]
    fn test_mode_change_is_ignored_once_started() {
        let mut room = room_with(&[("a", "alice")]);
        room.set_ready(&conn("a"), Some(true), None).unwrap();
        assert!(room.started());

        let mut friendly = classic();
        friendly.name = "Friendly".to_string();
        friendly.allow_deals = false;
        room.set_ready(&conn("a"), None, Some(friendly));

        assert_eq!(room.mode().name, "Classic");
    }

    #[test]
    fn test_mode_change_applies_in_lobby() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);

        let mut friendly = classic();
        friendly.name = "Friendly".to_string();
        room.set_ready(&conn("a"), None, Some(friendly)).unwrap();

        assert_eq!(room.mode().name, "Friendly");
        assert!(!room.started());
    }

    #[test]
    fn test_finish_turn_advances_in_join_order() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob"), ("c", "carol")]);
        let snapshot = room.roster()[0].clone();

        let outcome = room.finish_turn(&conn("a"), &snapshot).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("b")));
        assert_eq!(*room.current_turn(), Some(conn("b")));
    }

    #[test]
    fn test_finish_turn_skips_eliminated_members() {
        // given (precondition): bob is bankrupt but still in the room
        let mut room = room_with(&[("a", "alice"), ("b", "bob"), ("c", "carol")]);
        set_balance(&mut room, "b", 0);

        // when (operation): alice finishes her turn
        let snapshot = room.roster()[0].clone();
        let outcome = room.finish_turn(&conn("a"), &snapshot).unwrap();

        // then (expected result): the turn jumps straight to carol
        assert_eq!(outcome.turn_id, Some(conn("c")));
        assert!(room.contains(&conn("b")));
    }

    #[test]
    fn test_finish_turn_wraps_circularly() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        let a_snapshot = room.roster()[0].clone();
        room.finish_turn(&conn("a"), &a_snapshot).unwrap();

        let b_snapshot = room.roster()[1].clone();
        let outcome = room.finish_turn(&conn("b"), &b_snapshot).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("a")));
    }

    #[test]
    fn test_finish_turn_by_non_holder_applies_snapshot_but_does_not_advance() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        let mut snapshot = room.roster()[1].clone();
        snapshot.position = 12;

        let outcome = room.finish_turn(&conn("b"), &snapshot);

        assert!(outcome.is_none());
        assert_eq!(*room.current_turn(), Some(conn("a")));
        assert_eq!(room.position_of(&conn("b")), Some(12));
    }

    #[test]
    fn test_finish_turn_with_no_eligible_member_unsets_the_turn() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        set_balance(&mut room, "a", 0);
        set_balance(&mut room, "b", -200);

        let snapshot = room.roster()[0].clone();
        let outcome = room.finish_turn(&conn("a"), &snapshot).unwrap();

        assert_eq!(outcome.turn_id, None);
        assert_eq!(*room.current_turn(), None);
    }

    #[test]
    fn test_sole_solvent_holder_keeps_the_turn() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        set_balance(&mut room, "b", 0);

        let snapshot = room.roster()[0].clone();
        let outcome = room.finish_turn(&conn("a"), &snapshot).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("a")));
    }

    #[test]
    fn test_transfer_moves_money_and_conserves_the_total() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);

        let outcome = room.transfer(&conn("a"), &conn("b"), 500).unwrap();

        assert_eq!(outcome.payer.balance, 1000);
        assert_eq!(outcome.payee.balance, 2000);
        assert_eq!(balance_of(&room, "a") + balance_of(&room, "b"), 3000);
    }

    #[test]
    fn test_transfer_may_drive_the_payer_negative() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);

        let outcome = room.transfer(&conn("a"), &conn("b"), 2000).unwrap();

        assert_eq!(outcome.payer.balance, -500);
    }

    #[test]
    fn test_transfer_with_missing_party_mutates_nothing() {
        let mut room = room_with(&[("a", "alice")]);

        assert!(room.transfer(&conn("a"), &conn("ghost"), 500).is_none());
        assert!(room.transfer(&conn("ghost"), &conn("a"), 500).is_none());
        assert_eq!(balance_of(&room, "a"), 1500);
    }

    #[test]
    fn test_pay_then_finish_turn_scenario() {
        // Room with 3 members, balances [1500,1500,1500], turn = A.
        let mut room = room_with(&[("a", "alice"), ("b", "bob"), ("c", "carol")]);

        // A pays 500 to B: balances [1000,2000,1500], no turn change.
        room.transfer(&conn("a"), &conn("b"), 500).unwrap();
        assert_eq!(balance_of(&room, "a"), 1000);
        assert_eq!(balance_of(&room, "b"), 2000);
        assert_eq!(balance_of(&room, "c"), 1500);
        assert_eq!(*room.current_turn(), Some(conn("a")));

        // A finishes the turn with balance 1000: turn advances to B.
        let snapshot = room.roster()[0].clone();
        assert_eq!(snapshot.balance, 1000);
        let outcome = room.finish_turn(&conn("a"), &snapshot).unwrap();
        assert_eq!(outcome.turn_id, Some(conn("b")));
    }

    #[test]
    fn test_trade_swaps_exactly_the_named_property_sets() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        let reading = json!({ "posistion": 5, "group": "railroad" });
        let boardwalk = json!({ "posistion": 39, "group": "darkblue" });
        let park_place = json!({ "posistion": 37, "group": "darkblue" });
        let mut a_snapshot = room.roster()[0].clone();
        a_snapshot.properties = vec![reading.clone()];
        room.apply_player_update(&conn("a"), &a_snapshot);
        let mut b_snapshot = room.roster()[1].clone();
        b_snapshot.properties = vec![boardwalk.clone(), park_place.clone()];
        room.apply_player_update(&conn("b"), &b_snapshot);

        let outcome = room
            .execute_trade(&TradeProposal {
                turn_player: TradeSide {
                    id: conn("a"),
                    prop: vec![reading.clone()],
                    balance: 200,
                },
                against_player: TradeSide {
                    id: conn("b"),
                    prop: vec![boardwalk.clone()],
                    balance: 0,
                },
            })
            .unwrap();

        assert_eq!(outcome.initiator.properties, vec![boardwalk.clone()]);
        assert_eq!(
            outcome.respondent.properties,
            vec![park_place.clone(), reading.clone()]
        );
        assert_eq!(outcome.initiator.balance, 1300);
        assert_eq!(outcome.respondent.balance, 1700);
    }

    #[test]
    fn test_trade_conserves_total_balance() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        let before = balance_of(&room, "a") + balance_of(&room, "b");

        room.execute_trade(&TradeProposal {
            turn_player: TradeSide {
                id: conn("a"),
                prop: vec![],
                balance: 850,
            },
            against_player: TradeSide {
                id: conn("b"),
                prop: vec![],
                balance: 120,
            },
        })
        .unwrap();

        assert_eq!(
            balance_of(&room, "a") + balance_of(&room, "b"),
            before
        );
    }

    #[test]
    fn test_trade_does_not_validate_ownership() {
        // given (precondition): bob offers a token he never owned
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);
        let phantom = json!({ "posistion": 1 });

        // when (operation):
        let outcome = room
            .execute_trade(&TradeProposal {
                turn_player: TradeSide {
                    id: conn("a"),
                    prop: vec![],
                    balance: 0,
                },
                against_player: TradeSide {
                    id: conn("b"),
                    prop: vec![phantom.clone()],
                    balance: 0,
                },
            })
            .unwrap();

        // then (expected result): alice receives it anyway (accepted gap)
        assert_eq!(outcome.initiator.properties, vec![phantom]);
    }

    #[test]
    fn test_trade_with_missing_party_is_dropped() {
        let mut room = room_with(&[("a", "alice")]);

        let outcome = room.execute_trade(&TradeProposal {
            turn_player: TradeSide {
                id: conn("a"),
                prop: vec![],
                balance: 100,
            },
            against_player: TradeSide {
                id: conn("ghost"),
                prop: vec![],
                balance: 0,
            },
        });

        assert!(outcome.is_none());
        assert_eq!(balance_of(&room, "a"), 1500);
    }

    #[test]
    fn test_departure_of_turn_holder_advances_from_their_seat() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob"), ("c", "carol")]);

        let outcome = room.remove(&conn("a")).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("b")));
        assert!(!outcome.emptied);
        assert_eq!(room.roster().len(), 2);
    }

    #[test]
    fn test_departure_of_non_holder_keeps_the_turn() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob")]);

        let outcome = room.remove(&conn("b")).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("a")));
    }

    #[test]
    fn test_departure_skips_eliminated_members() {
        let mut room = room_with(&[("a", "alice"), ("b", "bob"), ("c", "carol")]);
        set_balance(&mut room, "b", -50);

        let outcome = room.remove(&conn("a")).unwrap();

        assert_eq!(outcome.turn_id, Some(conn("c")));
    }

    #[test]
    fn test_vacating_the_room_resets_started() {
        // Scenario: the last member disconnects while holding the turn.
        let mut room = room_with(&[("c", "carol")]);
        room.set_ready(&conn("c"), Some(true), None).unwrap();
        assert!(room.started());

        let outcome = room.remove(&conn("c")).unwrap();

        assert!(outcome.emptied);
        assert_eq!(outcome.turn_id, None);
        assert!(!room.started());
        assert_eq!(room.phase(), RoomPhase::Joinable);
    }

    #[test]
    fn test_rejoin_restores_persisted_fields() {
        let mut room = Room::new("TEST01", classic(), 6);
        let persisted = PersistedPlayer {
            peer_id: "old-conn".to_string(),
            username: "carol".to_string(),
            icon: 2,
            position: 17,
            balance: 730,
            properties: vec![json!({ "posistion": 6 })],
            is_in_jail: true,
            jail_turns: 1,
            getout_cards: 2,
            is_connected: false,
            is_ready: true,
        };

        let outcome = room.admit_rejoined(conn("new-conn"), &persisted);

        assert_eq!(outcome.old_id, conn("old-conn"));
        assert_eq!(outcome.snapshot.id, conn("new-conn"));
        assert_eq!(outcome.snapshot.position, 17);
        assert_eq!(outcome.snapshot.balance, 730);
        assert_eq!(outcome.snapshot.properties, vec![json!({ "posistion": 6 })]);
        assert!(outcome.snapshot.is_in_jail);
        assert_eq!(outcome.snapshot.jail_turns_remaining, 1);
        assert_eq!(outcome.snapshot.getout_cards, 2);
    }

    #[test]
    fn test_rejoin_remaps_the_turn_iff_the_old_connection_held_it() {
        let mut room = Room::resumed(
            "TEST01",
            classic(),
            true,
            Some(conn("old-conn")),
            6,
        );
        let mut persisted = PersistedPlayer {
            peer_id: "old-conn".to_string(),
            username: "alice".to_string(),
            icon: 0,
            position: 0,
            balance: 1500,
            properties: vec![],
            is_in_jail: false,
            jail_turns: 0,
            getout_cards: 0,
            is_connected: false,
            is_ready: true,
        };

        let outcome = room.admit_rejoined(conn("new-conn"), &persisted);
        assert_eq!(outcome.turn_id, Some(conn("new-conn")));

        // A second identity that did not hold the turn leaves it alone.
        persisted.peer_id = "other-old".to_string();
        persisted.username = "bob".to_string();
        let other = room.admit_rejoined(conn("other-new"), &persisted);
        assert_eq!(other.turn_id, Some(conn("new-conn")));
    }

    #[test]
    fn test_phase_codes() {
        let mut room = Room::new("TEST01", classic(), 2);
        assert_eq!(room.phase().code(), 0);

        room.join(conn("a"), "alice");
        room.join(conn("b"), "bob");
        assert_eq!(room.phase().code(), 2);

        room.set_ready(&conn("a"), Some(true), None).unwrap();
        room.set_ready(&conn("b"), Some(true), None).unwrap();
        assert_eq!(room.phase().code(), 1);
    }
}
