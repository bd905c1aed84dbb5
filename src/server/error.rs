//! HTTP error mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::debug;

use crate::types::QUESTION_REQUIRED;

/// Errors a handler can surface to the client.
///
/// Only malformed input is ever reported; upstream and internal failures
/// degrade to fallback answers inside the policy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: &message }),
            )
                .into_response(),
        }
    }
}

/// A body that is not JSON, or whose `question` is not a string, is
/// reported the same way as a missing question.
impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        debug!(error = %err, "rejected chat body");
        ApiError::BadRequest(QUESTION_REQUIRED.to_string())
    }
}

/// Handy result alias used across handlers.
pub type ApiResult<T> = Result<T, ApiError>;
