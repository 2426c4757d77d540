use crate::core::error::{Error, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, OptionalFromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use tracing::warn;

/// Header naming the participant a request is made on behalf of.
pub const USER_HEADER: &str = "user";

/// Requesting participant, taken from the `user` header.
///
/// No authentication happens here; the name is only checked against the
/// participant store by the operations that need it.
#[derive(Clone, Debug)]
pub struct Ctx {
    user: String,
}

impl Ctx {
    pub fn new(user: String) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

fn user_from_parts(parts: &Parts) -> Result<Option<Ctx>> {
    let Some(value) = parts.headers.get(USER_HEADER) else {
        return Ok(None);
    };
    let user = value
        .to_str()
        .map_err(|_| Error::validation("user header is not valid UTF-8"))?;
    Ok(Some(Ctx::new(user.to_string())))
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        user_from_parts(parts)?.ok_or_else(|| Error::validation("missing user header"))
    }
}

impl<S> OptionalFromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>> {
        // An unreadable header is treated the same as an absent one.
        match user_from_parts(parts) {
            Ok(ctx) => Ok(ctx),
            Err(e) => {
                warn!("Ignoring unreadable user header: {}", e);
                Ok(None)
            }
        }
    }
}

/// JSON body extractor that reports every rejection as a validation error.
///
/// Plain `axum::Json` answers 400/415 for syntax and content-type problems;
/// the chat API answers 422 for any malformed body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        Ok(ValidJson(value))
    }
}

/// Query string extractor that reports every rejection as a validation error.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(value) = <Query<T> as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::validation(rejection.body_text()))?;
        Ok(ValidQuery(value))
    }
}
