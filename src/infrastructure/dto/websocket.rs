//! WebSocket wire protocol.
//!
//! Every message is an envelope `{"event": <name>, "data": <payload>}` with
//! one enum variant per event name, validated at the boundary before
//! dispatch. Event and field names are fixed by the deployed clients; the
//! occasional camelCase oddity (`listOfNums`, `pJson`, `recieveMoney`) is
//! wire format, not style.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Card, ConnectionId, GameMode, PlayerSnapshot, TradeProposal, WinningMode,
};

/// Turn pointer on the wire: the holder's connection id, or `""` when no
/// member qualifies.
pub fn turn_field(turn: &Option<ConnectionId>) -> String {
    turn.as_ref()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default()
}

/// How a jailed player chose to get out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnjailOption {
    Card,
    Pay,
}

/// Serializes to `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

// ── Client → server ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Join the room under a username.
    #[serde(rename = "name")]
    Name(String),
    /// Reclaim a persisted identity after a disconnect.
    #[serde(rename = "rejoin")]
    Rejoin { username: String },
    /// Toggle readiness and/or select a game mode.
    #[serde(rename = "ready")]
    Ready {
        #[serde(default)]
        ready: Option<bool>,
        #[serde(default)]
        mode: Option<GameMode>,
    },
    #[serde(rename = "unjail")]
    Unjail(UnjailOption),
    #[serde(rename = "roll_dice")]
    RollDice,
    /// Chance-or-community-chest draw.
    #[serde(rename = "chorch_roll")]
    ChorchRoll { is_chance: bool, rolls: u32 },
    #[serde(rename = "player_update")]
    PlayerUpdate {
        #[serde(rename = "playerId")]
        player_id: ConnectionId,
        #[serde(rename = "pJson")]
        p_json: PlayerSnapshot,
    },
    #[serde(rename = "finish-turn")]
    FinishTurn(PlayerSnapshot),
    #[serde(rename = "message")]
    Message(String),
    #[serde(rename = "pay")]
    Pay {
        balance: i64,
        from: ConnectionId,
        to: ConnectionId,
    },
    #[serde(rename = "mouse")]
    Mouse { x: f64, y: f64 },
    /// Opaque history entry, relayed verbatim.
    #[serde(rename = "history")]
    History(serde_json::Value),
    #[serde(rename = "trade")]
    Trade,
    #[serde(rename = "cancel-trade")]
    CancelTrade,
    #[serde(rename = "submit-trade")]
    SubmitTrade(TradeProposal),
    #[serde(rename = "trade-update")]
    TradeUpdate(TradeProposal),
}

// ── Server → client ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InitialsPayload {
    pub turn_id: String,
    pub other_players: Vec<PlayerSnapshot>,
    #[serde(rename = "selectedMode")]
    pub selected_mode: GameMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejoinSuccessPayload {
    pub turn_id: String,
    pub other_players: Vec<PlayerSnapshot>,
    #[serde(rename = "selectedMode")]
    pub selected_mode: GameMode,
    #[serde(rename = "gameStarted")]
    pub game_started: bool,
    #[serde(rename = "myPlayer")]
    pub my_player: PlayerSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRejoinedPayload {
    pub player: PlayerSnapshot,
    #[serde(rename = "newPeerId")]
    pub new_peer_id: ConnectionId,
    #[serde(rename = "oldPeerId")]
    pub old_peer_id: ConnectionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadyPayload {
    pub id: ConnectionId,
    pub state: bool,
    #[serde(rename = "selectedMode")]
    pub selected_mode: GameMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiceRollResultPayload {
    /// `[first die, second die, projected position]`.
    #[serde(rename = "listOfNums")]
    pub list_of_nums: [u8; 3],
    #[serde(rename = "turnId")]
    pub turn_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChorchResultPayload {
    pub element: Card,
    pub is_chance: bool,
    pub rolls: u32,
    #[serde(rename = "turnId")]
    pub turn_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerUpdatePayload {
    #[serde(rename = "playerId")]
    pub player_id: ConnectionId,
    #[serde(rename = "pJson")]
    pub p_json: PlayerSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnFinishedPayload {
    pub from: ConnectionId,
    #[serde(rename = "turnId")]
    pub turn_id: String,
    #[serde(rename = "pJson")]
    pub p_json: PlayerSnapshot,
    #[serde(rename = "WinningMode")]
    pub winning_mode: WinningMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberUpdatingPayload {
    #[serde(rename = "playerId")]
    pub player_id: ConnectionId,
    pub animation: String,
    pub additional_props: Vec<ConnectionId>,
    /// `[payee, payer]` snapshots.
    #[serde(rename = "pJson")]
    pub p_json: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitTradePayload {
    #[serde(rename = "pJsons")]
    pub p_jsons: Vec<PlayerSnapshot>,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Room occupancy: 0 = joinable, 1 = in progress, 2 = full/closed.
    #[serde(rename = "state")]
    State(u8),
    #[serde(rename = "initials")]
    Initials(InitialsPayload),
    #[serde(rename = "new-player")]
    NewPlayer(PlayerSnapshot),
    #[serde(rename = "rejoin-success")]
    RejoinSuccess(RejoinSuccessPayload),
    #[serde(rename = "rejoin-failed")]
    RejoinFailed { reason: String },
    #[serde(rename = "player-rejoined")]
    PlayerRejoined(PlayerRejoinedPayload),
    #[serde(rename = "ready")]
    Ready(ReadyPayload),
    #[serde(rename = "start-game")]
    StartGame(EmptyPayload),
    #[serde(rename = "unjail")]
    Unjail {
        to: ConnectionId,
        option: UnjailOption,
    },
    #[serde(rename = "dice_roll_result")]
    DiceRollResult(DiceRollResultPayload),
    #[serde(rename = "chorch_result")]
    ChorchResult(ChorchResultPayload),
    #[serde(rename = "player_update")]
    PlayerUpdate(PlayerUpdatePayload),
    #[serde(rename = "turn-finished")]
    TurnFinished(TurnFinishedPayload),
    #[serde(rename = "message")]
    Message { from: String, message: String },
    #[serde(rename = "member_updating")]
    MemberUpdating(MemberUpdatingPayload),
    #[serde(rename = "mouse")]
    Mouse { id: ConnectionId, x: f64, y: f64 },
    #[serde(rename = "history")]
    History(serde_json::Value),
    #[serde(rename = "trade")]
    Trade(EmptyPayload),
    #[serde(rename = "cancel-trade")]
    CancelTrade(EmptyPayload),
    #[serde(rename = "submit-trade")]
    SubmitTrade(SubmitTradePayload),
    #[serde(rename = "trade-update")]
    TradeUpdate(TradeProposal),
    #[serde(rename = "disconnected-player")]
    DisconnectedPlayer { id: ConnectionId, turn: String },
}
