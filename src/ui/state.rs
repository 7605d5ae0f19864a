//! Server state shared across handlers.

use std::sync::Arc;

use crate::usecase::GameSession;

/// Shared application state
pub struct AppState {
    /// The one session this process hosts
    pub session: Arc<GameSession>,
}
