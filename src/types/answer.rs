//! Answer and provenance types

use serde::{Deserialize, Serialize};

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Served from the response cache.
    Cache,
    /// Generated by the hosted model and accepted by the quality filter.
    Upstream,
    /// Canned keyword answer after the upstream failed or was rejected.
    Fallback,
    /// Canned keyword answer after an internal error during resolution.
    ErrorFallback,
}

impl Source {
    /// Wire name, as serialized in responses and used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Upstream => "upstream",
            Source::Fallback => "fallback",
            Source::ErrorFallback => "error-fallback",
        }
    }
}

/// A final answer and its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text, never empty.
    pub text: String,
    /// Which component produced the text.
    pub source: Source,
}

impl Answer {
    pub fn new(text: impl Into<String>, source: Source) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}
