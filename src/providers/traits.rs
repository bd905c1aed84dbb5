//! Provider trait for hosted text generation.
//!
//! The [`UpstreamClient`](super::UpstreamClient) owns endpoint rotation and
//! never talks HTTP itself; it hands each attempt to a [`GenerateProvider`].
//! This keeps the rotation policy testable with in-process mocks and leaves
//! room for other hosted backends.
//!
//! # Error contract
//!
//! Providers classify failures through [`ChattyError`](crate::ChattyError):
//! - transient errors (`RateLimited`, `ModelLoading`, `Api { status: 503 }`)
//!   make the client rotate to the next endpoint
//! - everything else ends the query for this request

use async_trait::async_trait;

use super::endpoints::Endpoint;
use crate::Result;
use crate::types::GenerationParams;

/// Provider for single-shot text generation.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Generate a continuation of `prompt` on the given endpoint.
    ///
    /// Returns the raw generated text; answer-marker extraction and trimming
    /// happen in the caller.
    async fn generate(
        &self,
        prompt: &str,
        endpoint: &Endpoint,
        params: &GenerationParams,
    ) -> Result<String>;
}
