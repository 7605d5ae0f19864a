//! Data Transfer Objects: the JSON wire protocol spoken over WebSocket.

pub mod websocket;

pub use websocket::{ClientEvent, ServerEvent};
