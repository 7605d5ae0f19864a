//! No-op gateway used when persistence is not configured. Every write is
//! reported as skipped and every lookup comes back empty, so the room runs
//! memory-only and rejoin is unavailable.

use async_trait::async_trait;

use crate::domain::{
    GameMode, GatewayError, PersistedPlayer, PersistedRoom, PersistenceGateway, RoomRecordId,
};

pub struct DisabledGateway;

#[async_trait]
impl PersistenceGateway for DisabledGateway {
    async fn create_room(
        &self,
        _code: &str,
        _mode: &GameMode,
    ) -> Result<Option<RoomRecordId>, GatewayError> {
        Ok(None)
    }

    async fn find_room(&self, _code: &str) -> Result<Option<PersistedRoom>, GatewayError> {
        Ok(None)
    }

    async fn upsert_player(
        &self,
        _room: &RoomRecordId,
        _player: &PersistedPlayer,
    ) -> Result<bool, GatewayError> {
        Ok(false)
    }

    async fn update_room(
        &self,
        _room: &RoomRecordId,
        _current_turn_id: Option<String>,
        _started: bool,
        _mode: Option<GameMode>,
    ) -> Result<bool, GatewayError> {
        Ok(false)
    }

    async fn mark_disconnected(
        &self,
        _room: &RoomRecordId,
        _connection_id: &str,
    ) -> Result<bool, GatewayError> {
        Ok(false)
    }

    async fn find_player_by_username(
        &self,
        _room: &RoomRecordId,
        _username: &str,
    ) -> Result<Option<PersistedPlayer>, GatewayError> {
        Ok(None)
    }

    async fn rebind_connection_id(
        &self,
        _room: &RoomRecordId,
        _username: &str,
        _new_connection_id: &str,
    ) -> Result<bool, GatewayError> {
        Ok(false)
    }

    async fn delete_room(&self, _room: &RoomRecordId) -> Result<bool, GatewayError> {
        Ok(false)
    }
}
