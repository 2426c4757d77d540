//! Chat Service Layer
//!
//! Participant presence, the message log and per-participant visibility.

pub mod handlers;
pub mod messages;
pub mod participants;
pub mod presence;
pub mod visibility;

pub use handlers::router;
pub use presence::PresenceMonitor;
