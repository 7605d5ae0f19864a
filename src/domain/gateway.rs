//! Persistence gateway interface.
//!
//! The domain defines the interface it needs from the durable store; the
//! infrastructure layer provides the implementations (dependency inversion).
//! Every operation is allowed to fail — callers treat failure as
//! "persistence skipped", never as a client-visible error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::mode::GameMode;
use super::player::{PlayerSnapshot, PropertyToken};

/// Backend row identifier of a persisted room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomRecordId(String);

impl RoomRecordId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("persistence transport error: {0}")]
    Transport(String),
    #[error("persistence backend rejected the request: {0}")]
    Backend(String),
}

/// Durable copy of one player row. Field names match the backend columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPlayer {
    pub peer_id: String,
    pub username: String,
    pub icon: usize,
    pub position: u8,
    pub balance: i64,
    pub properties: Vec<PropertyToken>,
    pub is_in_jail: bool,
    pub jail_turns: u32,
    pub getout_cards: u32,
    pub is_connected: bool,
    pub is_ready: bool,
}

impl PersistedPlayer {
    /// Build the durable row for a live, connected member.
    pub fn from_snapshot(snapshot: &PlayerSnapshot, ready: bool) -> Self {
        Self {
            peer_id: snapshot.id.as_str().to_string(),
            username: snapshot.username.clone(),
            icon: snapshot.icon,
            position: snapshot.position,
            balance: snapshot.balance,
            properties: snapshot.properties.clone(),
            is_in_jail: snapshot.is_in_jail,
            jail_turns: snapshot.jail_turns_remaining,
            getout_cards: snapshot.getout_cards,
            is_connected: true,
            is_ready: ready,
        }
    }
}

/// Durable copy of a room, including its player rows.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistedRoom {
    pub id: RoomRecordId,
    pub code: String,
    pub current_turn_id: Option<String>,
    pub game_started: bool,
    pub selected_mode: Option<GameMode>,
    #[serde(default)]
    pub players: Vec<PersistedPlayer>,
}

/// Interface to the durable store consumed by the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Create a durable room record. `Ok(None)` means the backend declined
    /// (e.g. the code is already taken).
    async fn create_room(
        &self,
        code: &str,
        mode: &GameMode,
    ) -> Result<Option<RoomRecordId>, GatewayError>;

    /// Look up an existing room by its join code, with its player rows.
    async fn find_room(&self, code: &str) -> Result<Option<PersistedRoom>, GatewayError>;

    /// Insert or update a player row, keyed by `(room, username)`.
    async fn upsert_player(
        &self,
        room: &RoomRecordId,
        player: &PersistedPlayer,
    ) -> Result<bool, GatewayError>;

    /// Update the room-level state (turn pointer, started flag, mode).
    async fn update_room(
        &self,
        room: &RoomRecordId,
        current_turn_id: Option<String>,
        started: bool,
        mode: Option<GameMode>,
    ) -> Result<bool, GatewayError>;

    /// Flag the row bound to `connection_id` as disconnected, keeping it
    /// available for a later rejoin.
    async fn mark_disconnected(
        &self,
        room: &RoomRecordId,
        connection_id: &str,
    ) -> Result<bool, GatewayError>;

    /// Look up a player row by durable identity, for rejoin.
    async fn find_player_by_username(
        &self,
        room: &RoomRecordId,
        username: &str,
    ) -> Result<Option<PersistedPlayer>, GatewayError>;

    /// Bind a player row to a new connection id after a successful rejoin.
    async fn rebind_connection_id(
        &self,
        room: &RoomRecordId,
        username: &str,
        new_connection_id: &str,
    ) -> Result<bool, GatewayError>;

    /// Remove the room record and its players.
    async fn delete_room(&self, room: &RoomRecordId) -> Result<bool, GatewayError>;
}
