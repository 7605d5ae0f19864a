//! PostgREST-style gateway over HTTP (Supabase-compatible).
//!
//! Two tables: `games` (room-level state, keyed by join code) and `players`
//! (one row per durable identity, unique on `game_id, username`). Every
//! operation surfaces backend trouble as a [`GatewayError`]; callers treat
//! that as "persistence skipped".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    GameMode, GatewayError, PersistedPlayer, PersistedRoom, PersistenceGateway, RoomRecordId,
};

pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GameRow {
    id: String,
    code: String,
    current_turn_id: Option<String>,
    game_started: bool,
    selected_mode: Option<GameMode>,
}

#[derive(Debug, Serialize)]
struct PlayerRow<'a> {
    game_id: &'a str,
    #[serde(flatten)]
    player: &'a PersistedPlayer,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_status() {
            GatewayError::Backend(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl RestGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_players(&self, room: &RoomRecordId) -> Result<Vec<PersistedPlayer>, GatewayError> {
        let response = self
            .authed(self.http.get(self.endpoint("players")))
            .query(&[("game_id", format!("eq.{}", room.as_str()))])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PersistenceGateway for RestGateway {
    async fn create_room(
        &self,
        code: &str,
        mode: &GameMode,
    ) -> Result<Option<RoomRecordId>, GatewayError> {
        let response = self
            .authed(self.http.post(self.endpoint("games")))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({
                "code": code,
                "selected_mode": mode,
                "game_started": false,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!("backend declined game creation: {}", response.status());
            return Ok(None);
        }
        let rows: Vec<InsertedRow> = response.json().await?;
        Ok(rows.into_iter().next().map(|row| RoomRecordId::new(row.id)))
    }

    async fn find_room(&self, code: &str) -> Result<Option<PersistedRoom>, GatewayError> {
        let response = self
            .authed(self.http.get(self.endpoint("games")))
            .query(&[("code", format!("eq.{code}")), ("select", "*".to_string())])
            .send()
            .await?
            .error_for_status()?;
        let rows: Vec<GameRow> = response.json().await?;
        let Some(game) = rows.into_iter().next() else {
            return Ok(None);
        };
        let id = RoomRecordId::new(game.id);
        let players = self.fetch_players(&id).await?;
        Ok(Some(PersistedRoom {
            id,
            code: game.code,
            current_turn_id: game.current_turn_id,
            game_started: game.game_started,
            selected_mode: game.selected_mode,
            players,
        }))
    }

    async fn upsert_player(
        &self,
        room: &RoomRecordId,
        player: &PersistedPlayer,
    ) -> Result<bool, GatewayError> {
        self.authed(self.http.post(self.endpoint("players")))
            .query(&[("on_conflict", "game_id,username")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&PlayerRow {
                game_id: room.as_str(),
                player,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }

    async fn update_room(
        &self,
        room: &RoomRecordId,
        current_turn_id: Option<String>,
        started: bool,
        mode: Option<GameMode>,
    ) -> Result<bool, GatewayError> {
        let mut body = serde_json::json!({
            "current_turn_id": current_turn_id,
            "game_started": started,
        });
        if let Some(mode) = mode {
            body["selected_mode"] = serde_json::to_value(mode)
                .map_err(|e| GatewayError::Backend(e.to_string()))?;
        }
        self.authed(self.http.patch(self.endpoint("games")))
            .query(&[("id", format!("eq.{}", room.as_str()))])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }

    async fn mark_disconnected(
        &self,
        room: &RoomRecordId,
        connection_id: &str,
    ) -> Result<bool, GatewayError> {
        self.authed(self.http.patch(self.endpoint("players")))
            .query(&[
                ("game_id", format!("eq.{}", room.as_str())),
                ("peer_id", format!("eq.{connection_id}")),
            ])
            .json(&serde_json::json!({ "is_connected": false }))
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }

    async fn find_player_by_username(
        &self,
        room: &RoomRecordId,
        username: &str,
    ) -> Result<Option<PersistedPlayer>, GatewayError> {
        let response = self
            .authed(self.http.get(self.endpoint("players")))
            .query(&[
                ("game_id", format!("eq.{}", room.as_str())),
                ("username", format!("eq.{username}")),
            ])
            .send()
            .await?
            .error_for_status()?;
        let rows: Vec<PersistedPlayer> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn rebind_connection_id(
        &self,
        room: &RoomRecordId,
        username: &str,
        new_connection_id: &str,
    ) -> Result<bool, GatewayError> {
        self.authed(self.http.patch(self.endpoint("players")))
            .query(&[
                ("game_id", format!("eq.{}", room.as_str())),
                ("username", format!("eq.{username}")),
            ])
            .json(&serde_json::json!({
                "peer_id": new_connection_id,
                "is_connected": true,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }

    async fn delete_room(&self, room: &RoomRecordId) -> Result<bool, GatewayError> {
        self.authed(self.http.delete(self.endpoint("games")))
            .query(&[("id", format!("eq.{}", room.as_str()))])
            .send()
            .await?
            .error_for_status()?;
        Ok(true)
    }
}
