//! In-memory gateway: a faithful single-room model of the backend tables,
//! used by tests and local development.

use tokio::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    GameMode, GatewayError, PersistedPlayer, PersistedRoom, PersistenceGateway, RoomRecordId,
};

#[derive(Debug, Clone)]
struct StoredRoom {
    id: RoomRecordId,
    code: String,
    current_turn_id: Option<String>,
    game_started: bool,
    selected_mode: Option<GameMode>,
    /// Player rows, keyed by username (the durable identity).
    players: Vec<PersistedPlayer>,
}

pub struct InMemoryGateway {
    room: Mutex<Option<StoredRoom>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            room: Mutex::new(None),
        }
    }

    /// Test helper: read back the stored row for a username.
    pub async fn stored_player(&self, username: &str) -> Option<PersistedPlayer> {
        let room = self.room.lock().await;
        room.as_ref()?
            .players
            .iter()
            .find(|p| p.username == username)
            .cloned()
    }

    /// Test helper: the stored room-level state.
    pub async fn stored_room(&self) -> Option<(Option<String>, bool)> {
        let room = self.room.lock().await;
        room.as_ref()
            .map(|r| (r.current_turn_id.clone(), r.game_started))
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create_room(
        &self,
        code: &str,
        mode: &GameMode,
    ) -> Result<Option<RoomRecordId>, GatewayError> {
        let mut room = self.room.lock().await;
        if room.is_some() {
            return Ok(None);
        }
        let id = RoomRecordId::new(Uuid::new_v4().to_string());
        *room = Some(StoredRoom {
            id: id.clone(),
            code: code.to_string(),
            current_turn_id: None,
            game_started: false,
            selected_mode: Some(mode.clone()),
            players: Vec::new(),
        });
        Ok(Some(id))
    }

    async fn find_room(&self, code: &str) -> Result<Option<PersistedRoom>, GatewayError> {
        let room = self.room.lock().await;
        Ok(room.as_ref().filter(|r| r.code == code).map(|r| PersistedRoom {
            id: r.id.clone(),
            code: r.code.clone(),
            current_turn_id: r.current_turn_id.clone(),
            game_started: r.game_started,
            selected_mode: r.selected_mode.clone(),
            players: r.players.clone(),
        }))
    }

    async fn upsert_player(
        &self,
        room_id: &RoomRecordId,
        player: &PersistedPlayer,
    ) -> Result<bool, GatewayError> {
        let mut room = self.room.lock().await;
        let Some(room) = room.as_mut().filter(|r| &r.id == room_id) else {
            return Ok(false);
        };
        match room
            .players
            .iter_mut()
            .find(|p| p.username == player.username)
        {
            Some(existing) => *existing = player.clone(),
            None => room.players.push(player.clone()),
        }
        Ok(true)
    }

    async fn update_room(
        &self,
        room_id: &RoomRecordId,
        current_turn_id: Option<String>,
        started: bool,
        mode: Option<GameMode>,
    ) -> Result<bool, GatewayError> {
        let mut room = self.room.lock().await;
        let Some(room) = room.as_mut().filter(|r| &r.id == room_id) else {
            return Ok(false);
        };
        room.current_turn_id = current_turn_id;
        room.game_started = started;
        if let Some(mode) = mode {
            room.selected_mode = Some(mode);
        }
        Ok(true)
    }

    async fn mark_disconnected(
        &self,
        room_id: &RoomRecordId,
        connection_id: &str,
    ) -> Result<bool, GatewayError> {
        let mut room = self.room.lock().await;
        let Some(room) = room.as_mut().filter(|r| &r.id == room_id) else {
            return Ok(false);
        };
        match room.players.iter_mut().find(|p| p.peer_id == connection_id) {
            Some(player) => {
                player.is_connected = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_player_by_username(
        &self,
        room_id: &RoomRecordId,
        username: &str,
    ) -> Result<Option<PersistedPlayer>, GatewayError> {
        let room = self.room.lock().await;
        Ok(room
            .as_ref()
            .filter(|r| &r.id == room_id)
            .and_then(|r| r.players.iter().find(|p| p.username == username))
            .cloned())
    }

    async fn rebind_connection_id(
        &self,
        room_id: &RoomRecordId,
        username: &str,
        new_connection_id: &str,
    ) -> Result<bool, GatewayError> {
        let mut room = self.room.lock().await;
        let Some(room) = room.as_mut().filter(|r| &r.id == room_id) else {
            return Ok(false);
        };
        match room.players.iter_mut().find(|p| p.username == username) {
            Some(player) => {
                player.peer_id = new_connection_id.to_string();
                player.is_connected = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_room(&self, room_id: &RoomRecordId) -> Result<bool, GatewayError> {
        let mut room = self.room.lock().await;
        if room.as_ref().is_some_and(|r| &r.id == room_id) {
            *room = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
