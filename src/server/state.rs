//! Shared state for HTTP handlers.

use std::sync::Arc;

use tracing::{info, warn};

use super::config::Config;
use crate::Result;
use crate::cache::ResponseCache;
use crate::fallback::FallbackResponder;
use crate::policy::ResponsePolicy;
use crate::providers::{EndpointRing, HuggingFaceClient, UpstreamClient};

/// Application state shared across handlers.
pub struct AppState {
    pub policy: ResponsePolicy,
    /// Upstream model IDs in rotation order, for discovery.
    pub models: Vec<String>,
}

impl AppState {
    pub fn new(policy: ResponsePolicy, models: Vec<String>) -> Self {
        Self { policy, models }
    }

    /// Build the full answer pipeline from configuration.
    ///
    /// Without an API key the service runs in fallback-only mode.
    pub fn from_config(config: &Config, api_key: Option<String>) -> Result<Self> {
        let upstream = match api_key {
            Some(key) => {
                let provider = HuggingFaceClient::with_options(
                    key,
                    &config.upstream.base_url,
                    config.upstream.timeout(),
                )?;
                let ring = EndpointRing::from_models(config.upstream.models.iter().cloned());
                info!(
                    models = ?config.upstream.models,
                    timeout_secs = config.upstream.timeout_secs,
                    "upstream configured"
                );
                Some(
                    UpstreamClient::new(Arc::new(provider), Arc::new(ring))
                        .params(config.upstream.generation_params()),
                )
            }
            None => {
                warn!("no HuggingFace API key configured, serving fallback answers only");
                None
            }
        };

        let policy = ResponsePolicy::new(
            ResponseCache::new(&config.cache.cache_config()),
            upstream,
            FallbackResponder::default(),
            config.quality.clone(),
        );

        Ok(Self::new(policy, config.upstream.models.clone()))
    }

    pub fn upstream_configured(&self) -> bool {
        self.policy.upstream().is_some()
    }
}
