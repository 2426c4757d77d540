//! Core Router
//!
//! Handles shared infrastructure routes like the health check.

use crate::core::error::Result;
use crate::core::AppState;
use axum::{extract::State, routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health
///
/// 200 while the store answers, 500 otherwise.
async fn health_check(State(state): State<AppState>) -> Result<&'static str> {
    state.store.ping().await?;
    Ok("OK - Chat Server")
}
