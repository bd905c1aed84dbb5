//! Chatty error types

use std::time::Duration;

/// Chatty error types
#[derive(Debug, thiserror::Error)]
pub enum ChattyError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The hosted model is cold and still being loaded onto an inference node.
    #[error("model is loading (estimated {estimated_time:?})")]
    ModelLoading { estimated_time: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,

    /// Something inside request handling failed that no component anticipated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChattyError {
    /// Whether the failure is worth retrying against the next endpoint.
    ///
    /// Only "the service is busy or warming up" qualifies. Auth failures,
    /// malformed requests, network errors and timeouts are permanent for the
    /// duration of a request.
    pub fn is_transient(&self) -> bool {
        match self {
            ChattyError::RateLimited { .. } | ChattyError::ModelLoading { .. } => true,
            ChattyError::Api { status, .. } => *status == 503,
            _ => false,
        }
    }

    /// Provider-supplied wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ChattyError::RateLimited { retry_after } => *retry_after,
            ChattyError::ModelLoading { estimated_time } => *estimated_time,
            _ => None,
        }
    }

    /// Short stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ChattyError::Http(_) => "http",
            ChattyError::Timeout => "timeout",
            ChattyError::Api { .. } => "api",
            ChattyError::RateLimited { .. } => "rate_limited",
            ChattyError::ModelLoading { .. } => "model_loading",
            ChattyError::AuthenticationFailed => "auth",
            ChattyError::ModelNotFound(_) => "not_found",
            ChattyError::Json(_) => "json",
            ChattyError::InvalidInput(_) => "invalid_input",
            ChattyError::Configuration(_) => "configuration",
            ChattyError::EmptyResponse => "empty_response",
            ChattyError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for ChattyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChattyError::Timeout
        } else {
            ChattyError::Http(err.to_string())
        }
    }
}

/// Result type alias for Chatty operations
pub type Result<T> = std::result::Result<T, ChattyError>;
