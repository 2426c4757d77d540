use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{extract::State, http::StatusCode};
use tracing::info;

/// POST /status
///
/// Heartbeat for the participant named in the `user` header.
pub async fn heartbeat(State(state): State<AppState>, ctx: Option<Ctx>) -> Result<StatusCode> {
    let Some(ctx) = ctx else {
        return Err(Error::NotFound("<missing user header>".to_string()));
    };

    info!("POST /status - {}", ctx.user());
    state.participants.heartbeat(ctx.user()).await?;

    Ok(StatusCode::OK)
}
