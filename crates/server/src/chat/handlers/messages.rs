use crate::chat::visibility::parse_limit;
use crate::core::config::AppState;
use crate::core::ctx::{Ctx, ValidJson, ValidQuery};
use crate::core::error::Result;
use crate::core::models::{CreateMessageInput, Message};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<String>,
}

/// POST /messages
pub async fn post_message(
    State(state): State<AppState>,
    ctx: Ctx,
    ValidJson(input): ValidJson<CreateMessageInput>,
) -> Result<StatusCode> {
    info!("POST /messages - {} -> {}", ctx.user(), input.to);

    state
        .messages
        .send(ctx.user(), &input.to, &input.text, &input.kind)
        .await?;

    Ok(StatusCode::CREATED)
}

/// GET /messages?limit=N
pub async fn list_messages(
    State(state): State<AppState>,
    ctx: Ctx,
    ValidQuery(query): ValidQuery<ListMessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    info!("GET /messages - {} (limit {:?})", ctx.user(), query.limit);

    let limit = parse_limit(query.limit.as_deref())?;
    let messages = state.messages.list_for(ctx.user(), limit).await?;

    Ok(Json(messages))
}
