use thiserror::Error;

use crate::domain::GatewayError;

/// Why a rejoin attempt could not restore an identity.
#[derive(Debug, Error)]
pub enum RejoinError {
    /// No persisted row matches the username (or the room is memory-only).
    #[error("player not found in this game")]
    PlayerNotFound,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
