//! Domain layer: the authoritative game-session model.
//!
//! Everything here is synchronous, in-memory state with no I/O. The traits
//! ([`PersistenceGateway`], [`MessagePusher`]) define the interfaces the
//! domain needs from the outside world; the infrastructure layer provides
//! the implementations (dependency inversion).

pub mod content;
pub mod gateway;
pub mod mode;
pub mod player;
pub mod pusher;
pub mod room;

pub use content::{Card, ContentStore};
pub use gateway::{
    GatewayError, PersistedPlayer, PersistedRoom, PersistenceGateway, RoomRecordId,
};
pub use mode::{GameMode, WinningMode};
pub use player::{ConnectionId, Player, PlayerSnapshot, PropertyToken};
pub use pusher::{MessagePusher, PushError, PusherChannel};
pub use room::{
    CursorPosition, DepartureOutcome, JoinOutcome, Member, PaymentOutcome, ReadyOutcome,
    RejoinOutcome, Room, RoomPhase, TradeOutcome, TradeProposal, TradeSide, TurnOutcome,
};
