//! Response policy: the per-question decision flow.
//!
//! ```text
//! raw question ──► Question::parse ──(blank)──► InvalidInput
//!                        │
//!                        ▼
//!                  ResponseCache::get ──(hit)──► (text, cache)
//!                        │ miss
//!                        ▼
//!                  UpstreamClient::query
//!                        │
//!        None / rejected by QualityFilter ──► FallbackResponder ──► (text, fallback)
//!                        │ accepted
//!                        ▼
//!                  (text, upstream)
//!                        │
//!                  ResponseCache::insert
//! ```
//!
//! Anything that panics between the cache miss and the cache write is
//! caught and answered by the fallback responder as `error-fallback`.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::cache::ResponseCache;
use crate::fallback::FallbackResponder;
use crate::providers::UpstreamClient;
use crate::telemetry;
use crate::types::{Answer, Question, Source};
use crate::{ChattyError, Result};

/// Heuristics that reject upstream text as low quality.
///
/// Text is rejected when it is empty, shorter than `min_length` characters,
/// or contains any of `failure_phrases` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QualityFilter {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_failure_phrases")]
    pub failure_phrases: Vec<String>,
}

fn default_min_length() -> usize {
    10
}

fn default_failure_phrases() -> Vec<String> {
    vec!["trouble connecting".to_string(), "initializing".to_string()]
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            failure_phrases: default_failure_phrases(),
        }
    }
}

/// Why upstream text was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooShort,
    FailurePhrase,
}

impl QualityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = n;
        self
    }

    pub fn failure_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failure_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// `Ok(())` if the text may be served as an upstream answer.
    pub fn check(&self, text: &str) -> std::result::Result<(), Rejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::Empty);
        }
        if text.chars().count() < self.min_length {
            return Err(Rejection::TooShort);
        }
        let lower = text.to_lowercase();
        if self
            .failure_phrases
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
        {
            return Err(Rejection::FailurePhrase);
        }
        Ok(())
    }

    pub fn accepts(&self, text: &str) -> bool {
        self.check(text).is_ok()
    }
}

/// Orchestrates cache, upstream and fallback for each question.
pub struct ResponsePolicy {
    cache: ResponseCache,
    upstream: Option<UpstreamClient>,
    fallback: FallbackResponder,
    filter: QualityFilter,
}

impl ResponsePolicy {
    /// Build a policy. `upstream` is `None` when no credential is
    /// configured; every miss is then answered by the fallback responder.
    pub fn new(
        cache: ResponseCache,
        upstream: Option<UpstreamClient>,
        fallback: FallbackResponder,
        filter: QualityFilter,
    ) -> Self {
        Self {
            cache,
            upstream,
            fallback,
            filter,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn upstream(&self) -> Option<&UpstreamClient> {
        self.upstream.as_ref()
    }

    pub fn fallback(&self) -> &FallbackResponder {
        &self.fallback
    }

    /// Answer a raw question.
    ///
    /// Fails only with [`ChattyError::InvalidInput`] for an absent or blank
    /// question; every other outcome is a non-empty answer.
    #[instrument(skip_all)]
    pub async fn answer(&self, raw_question: Option<&str>) -> Result<Answer> {
        let question = Question::parse(raw_question)?;
        info!(question = %question, "question received");

        if let Some(text) = self.cache.get(question.as_str()).await {
            debug!("serving from cache");
            return Ok(self.finish(Answer::new(text, Source::Cache)));
        }

        let resolved = AssertUnwindSafe(self.resolve(&question))
            .catch_unwind()
            .await
            .map_err(|panic| ChattyError::Internal(panic_message(panic.as_ref())));

        let answer = match resolved {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "answer resolution failed, using fallback");
                metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => "internal").increment(1);
                Answer::new(
                    self.fallback.respond(question.as_str()),
                    Source::ErrorFallback,
                )
            }
        };

        Ok(self.finish(answer))
    }

    /// Steps after a cache miss: upstream, filter, fallback, cache write.
    async fn resolve(&self, question: &Question) -> Answer {
        let upstream = match &self.upstream {
            Some(client) => client.query(question.as_str()).await,
            None => None,
        };

        let (text, source) = match upstream {
            None => {
                info!("no upstream answer, using fallback");
                metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => "no_upstream")
                    .increment(1);
                (self.fallback.respond(question.as_str()), Source::Fallback)
            }
            Some(text) => match self.filter.check(&text) {
                Ok(()) => (text.trim().to_string(), Source::Upstream),
                Err(reason) => {
                    info!(?reason, "upstream answer rejected, using fallback");
                    metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => "rejected")
                        .increment(1);
                    (self.fallback.respond(question.as_str()), Source::Fallback)
                }
            },
        };

        let text = match text.trim() {
            "" => {
                metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => "empty").increment(1);
                self.fallback.default_answer()
            }
            trimmed => trimmed.to_string(),
        };

        self.cache.insert(question.as_str(), text.clone()).await;
        Answer::new(text, source)
    }

    fn finish(&self, answer: Answer) -> Answer {
        metrics::counter!(telemetry::REQUESTS_TOTAL, "source" => answer.source.as_str())
            .increment(1);
        debug!(source = answer.source.as_str(), chars = answer.text.len(), "answer ready");
        answer
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during answer resolution".to_string()
    }
}
