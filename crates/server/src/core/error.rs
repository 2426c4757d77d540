use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, rejected before any store mutation.
    #[error("{0}")]
    Validation(String),

    #[error("participant {0} already exists")]
    Conflict(String),

    #[error("participant {0} not found")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Store failures are logged here; the client only sees a generic message.
        let error_message = match &self {
            Error::Store(e) => {
                error!("Store operation failed: {}", e);
                "Internal store error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}
