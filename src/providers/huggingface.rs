//! HuggingFace Inference API client for text generation.
//!
//! This client uses HuggingFace's serverless inference endpoints
//! (`POST {base_url}/models/{model}`).
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::endpoints::Endpoint;
use super::traits::GenerateProvider;
use crate::types::GenerationParams;
use crate::{ChattyError, Result};

/// Default base URL for HuggingFace Inference API
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Client for the HuggingFace text-generation pipeline.
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl HuggingFaceClient {
    /// Create a client against the public Inference API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and per-attempt timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChattyError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run the text-generation pipeline for one prompt.
    ///
    /// # Arguments
    /// * `prompt` - Full rendered prompt
    /// * `model` - Full HuggingFace model ID (e.g., `google/flan-t5-xl`)
    /// * `params` - Sampling parameters
    pub async fn generate_text(
        &self,
        prompt: &str,
        model: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let url = format!("{}/models/{}", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&GenerateRequest {
                inputs: prompt,
                parameters: params,
            })
            .send()
            .await?;

        let response = self.handle_response_errors(response, model).await?;

        let body = response.text().await?;
        match serde_json::from_str::<GenerateResponse>(&body)? {
            GenerateResponse::Batch(items) => items
                .into_iter()
                .next()
                .map(|item| item.generated_text)
                .ok_or(ChattyError::EmptyResponse),
            GenerateResponse::Single(item) => Ok(item.generated_text),
            // Some deployments report failures inside a 200 body.
            GenerateResponse::Error(err) => Err(err.into_error(StatusCode::OK)),
        }
    }

    /// Check response status and map to appropriate error.
    async fn handle_response_errors(
        &self,
        response: reqwest::Response,
        model: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => Err(ChattyError::AuthenticationFailed),
            404 => Err(ChattyError::ModelNotFound(model.to_string())),
            429 => {
                // Try to parse retry-after header
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(ChattyError::RateLimited { retry_after })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<ErrorBody>(&body) {
                    Ok(err) => Err(err.into_error(status)),
                    Err(_) if status == StatusCode::SERVICE_UNAVAILABLE => {
                        Err(ChattyError::ModelLoading {
                            estimated_time: None,
                        })
                    }
                    Err(_) => Err(ChattyError::Api {
                        status: status.as_u16(),
                        message: format!("HuggingFace API error: {status}"),
                    }),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
    Error(ErrorBody),
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// `{"error": "...", "estimated_time": 20.0}` as sent by the Inference API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

impl ErrorBody {
    fn into_error(self, status: StatusCode) -> ChattyError {
        let loading = self.estimated_time.is_some() || self.error.to_lowercase().contains("loading");
        if loading {
            ChattyError::ModelLoading {
                estimated_time: self
                    .estimated_time
                    .filter(|secs| secs.is_finite() && *secs >= 0.0)
                    .map(Duration::from_secs_f64),
            }
        } else {
            ChattyError::Api {
                status: status.as_u16(),
                message: self.error,
            }
        }
    }
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl GenerateProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(
        &self,
        prompt: &str,
        endpoint: &Endpoint,
        params: &GenerationParams,
    ) -> Result<String> {
        self.generate_text(prompt, &endpoint.model, params).await
    }
}
