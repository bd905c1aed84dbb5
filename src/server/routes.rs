//! HTTP handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::types::{Answer, Source};
use crate::{ChattyError, PKG_VERSION, SERVICE_NAME};

/// Request payload for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Response payload for `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub source: Source,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            source: answer.source,
        }
    }
}

/// Handler: POST /api/chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is Urban Farm Lab?"}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(body) = payload?;

    match state.policy.answer(body.question.as_deref()).await {
        Ok(answer) => {
            info!(source = answer.source.as_str(), "answer sent");
            Ok(Json(answer.into()))
        }
        Err(ChattyError::InvalidInput(message)) => Err(ApiError::BadRequest(message)),
        Err(e) => {
            // The policy only fails on input; anything else still gets an answer.
            error!(error = %e, "unexpected policy error");
            let text = state
                .policy
                .fallback()
                .respond(body.question.as_deref().unwrap_or_default());
            Ok(Json(ChatResponse {
                answer: text,
                source: Source::ErrorFallback,
            }))
        }
    }
}

/// Handler: GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": PKG_VERSION,
        "cache_entries": state.policy.cache().len().await,
        "upstream_configured": state.upstream_configured(),
    }))
}

/// Handler: GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": format!("{SERVICE_NAME} is running!"),
        "version": PKG_VERSION,
        "status": "operational",
        "endpoints": {
            "chat": "POST /api/chat",
            "health": "GET /health",
            "test": "GET /test",
        },
        "upstream_models": state.models,
    }))
}

/// Handler: GET /test
///
/// Sends the probe question straight to the upstream client, bypassing the
/// cache and the quality filter.
pub async fn test_upstream(State(state): State<Arc<AppState>>) -> Json<Value> {
    let Some(upstream) = state.policy.upstream() else {
        return Json(json!({
            "status": "API test skipped",
            "response": Value::Null,
            "api_status": "not_configured",
        }));
    };

    let response = upstream.probe().await;
    let api_status = if response.is_some() {
        "available"
    } else {
        "unavailable"
    };
    Json(json!({
        "status": "API test completed",
        "response": response,
        "api_status": api_status,
    }))
}
