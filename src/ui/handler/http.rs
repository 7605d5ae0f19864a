//! HTTP endpoints: health check and a debug view of the room.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use super::super::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full JSON dump of the in-memory room, for debugging only.
pub async fn debug_room(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.session.snapshot_room().await)
}
