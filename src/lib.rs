//! Boardwalk session server library.
//!
//! Authoritative room state machine and event-broadcast engine for a
//! Monopoly-style multiplayer board game, served over WebSocket. One process
//! hosts one room; disconnected players can rejoin by username through a
//! best-effort persistence gateway.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
