//! Core Service Layer
//!
//! Shared infrastructure for the chat server: configuration, errors,
//! request context, data models and storage.

pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod router;
pub mod store;

// Re-exports for convenience
pub use config::{AppState, ChatServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
