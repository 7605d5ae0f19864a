//! Usecase layer: session orchestration.
//!
//! [`GameSession`] owns the room behind a lock and turns validated client
//! events into room mutations, broadcasts and fire-and-forget persistence
//! writes. Handlers are grouped by concern, one module each.

pub mod bootstrap;
mod connect;
mod disconnect;
pub mod error;
mod gameplay;
mod lobby;
pub mod session;
mod trade;

pub use bootstrap::bootstrap_session;
pub use error::RejoinError;
pub use session::GameSession;
