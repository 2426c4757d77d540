use crate::core::config::AppState;
use crate::core::ctx::ValidJson;
use crate::core::error::Result;
use crate::core::models::{CreateParticipantInput, Participant};
use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

/// POST /participants
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateParticipantInput>,
) -> Result<StatusCode> {
    info!("POST /participants - {}", input.name);

    state
        .participants
        .register(&input.name)
        .await
        .inspect_err(|e| warn!("Registration of {:?} rejected: {}", input.name, e))?;

    Ok(StatusCode::CREATED)
}

/// GET /participants
pub async fn list_participants(State(state): State<AppState>) -> Result<Json<Vec<Participant>>> {
    info!("GET /participants");
    Ok(Json(state.participants.list().await?))
}
