//! Upstream query client: prompt rendering plus endpoint rotation.
//!
//! # Rotation
//!
//! ```text
//! query("What is Urban Farm Lab?")
//!         │ render prompt, start at ring cursor (say 1)
//!         ▼
//!   endpoint[1] ── 503 / 429 / loading ──► advance cursor 1 → 2
//!         │                                      │
//!         │ ok                                   ▼
//!         ▼                              endpoint[2] ── ... ──► up to len() attempts
//!   extract_answer() → Some(text)
//!
//!   401 / 404 / timeout / network / bad body ──► None (no further attempts)
//! ```
//!
//! Attempts within one request walk the ring from the index they started at,
//! so endpoint N failing is always followed by N+1 for that request even if
//! a concurrent request moved the shared cursor meanwhile.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use super::endpoints::EndpointRing;
use super::traits::GenerateProvider;
use crate::prompt::{PromptTemplate, extract_answer};
use crate::telemetry;
use crate::types::GenerationParams;

/// Question used by [`UpstreamClient::probe()`].
pub const PROBE_QUESTION: &str = "What is Urban Farm Lab?";

/// Sends templated prompts to the hosted generator, rotating endpoints on
/// transient failure.
pub struct UpstreamClient {
    provider: Arc<dyn GenerateProvider>,
    ring: Arc<EndpointRing>,
    template: PromptTemplate,
    params: GenerationParams,
}

impl UpstreamClient {
    pub fn new(provider: Arc<dyn GenerateProvider>, ring: Arc<EndpointRing>) -> Self {
        Self {
            provider,
            ring,
            template: PromptTemplate::default(),
            params: GenerationParams::default(),
        }
    }

    /// Replace the generation parameters.
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// The shared endpoint ring.
    pub fn ring(&self) -> &Arc<EndpointRing> {
        &self.ring
    }

    /// Ask the hosted generator.
    ///
    /// Returns the extracted, trimmed answer (possibly empty), or `None` when
    /// no endpoint produced one.
    #[instrument(skip(self, question), fields(provider = self.provider.name()))]
    pub async fn query(&self, question: &str) -> Option<String> {
        if self.ring.is_empty() {
            warn!("no upstream endpoints configured");
            return None;
        }

        let prompt = self.template.render(question);
        let start = self.ring.cursor();

        for attempt in 0..self.ring.len() {
            let index = (start + attempt) % self.ring.len();
            let endpoint = self.ring.get(index);
            debug!(model = %endpoint, attempt = attempt + 1, "querying upstream");

            let started = Instant::now();
            let result = self.provider.generate(&prompt, endpoint, &self.params).await;
            metrics::histogram!(telemetry::UPSTREAM_DURATION_SECONDS,
                "model" => endpoint.model.clone(),
            )
            .record(started.elapsed().as_secs_f64());

            match result {
                Ok(generated) => {
                    metrics::counter!(telemetry::UPSTREAM_ATTEMPTS_TOTAL,
                        "model" => endpoint.model.clone(),
                        "status" => "ok",
                    )
                    .increment(1);
                    info!(model = %endpoint, attempt = attempt + 1, "upstream answered");
                    return Some(extract_answer(&generated));
                }
                Err(e) if e.is_transient() => {
                    metrics::counter!(telemetry::UPSTREAM_ATTEMPTS_TOTAL,
                        "model" => endpoint.model.clone(),
                        "status" => e.kind(),
                    )
                    .increment(1);
                    metrics::counter!(telemetry::ENDPOINT_ROTATIONS_TOTAL,
                        "model" => endpoint.model.clone(),
                    )
                    .increment(1);
                    let cursor = self.ring.advance_from(index);
                    warn!(
                        model = %endpoint,
                        attempt = attempt + 1,
                        max_attempts = self.ring.len(),
                        cursor,
                        error = %e,
                        "endpoint unavailable, rotating"
                    );
                }
                Err(e) => {
                    metrics::counter!(telemetry::UPSTREAM_ATTEMPTS_TOTAL,
                        "model" => endpoint.model.clone(),
                        "status" => e.kind(),
                    )
                    .increment(1);
                    warn!(model = %endpoint, error = %e, "upstream failed");
                    return None;
                }
            }
        }

        warn!(endpoints = self.ring.len(), "all upstream endpoints exhausted");
        None
    }

    /// One query for [`PROBE_QUESTION`], for reachability diagnostics.
    pub async fn probe(&self) -> Option<String> {
        self.query(PROBE_QUESTION).await
    }
}
