//! Infrastructure layer: concrete implementations of the domain interfaces
//! and the wire message types.

pub mod dto;
pub mod persistence;
pub mod pusher;
