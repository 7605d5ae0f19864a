//! Concrete [`crate::domain::PersistenceGateway`] implementations.
//!
//! - `rest`: PostgREST-style row store over HTTP (the production backend)
//! - `memory`: in-process store for tests and local development
//! - `disabled`: no-op gateway for memory-only operation

pub mod disabled;
pub mod memory;
pub mod rest;

pub use disabled::DisabledGateway;
pub use memory::InMemoryGateway;
pub use rest::RestGateway;
