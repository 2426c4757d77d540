//! Chat Handlers and Router
//!
//! Participant registration, message posting/listing and heartbeats.

use crate::core::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod messages;
pub mod participants;
pub mod presence;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            get(participants::list_participants).post(participants::register),
        )
        .route(
            "/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route("/status", post(presence::heartbeat))
}
