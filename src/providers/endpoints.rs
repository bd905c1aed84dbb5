//! Ordered upstream endpoints with a shared rotating cursor.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// One upstream target: a hosted text-generation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Full model ID, e.g. `microsoft/DialoGPT-large`.
    pub model: String,
}

impl Endpoint {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

/// Default model rotation, most capable first.
pub const DEFAULT_MODELS: &[&str] = &["microsoft/DialoGPT-large", "google/flan-t5-xl", "gpt2"];

/// Fixed endpoint list plus the process-wide "current endpoint" cursor.
///
/// The cursor is shared by all in-flight requests. Advances use
/// compare-and-swap from the index the caller observed failing, so two
/// requests that saw the same endpoint fail move the cursor once, and a
/// stale advance never drags the cursor backwards past a newer one.
#[derive(Debug)]
pub struct EndpointRing {
    endpoints: Vec<Endpoint>,
    cursor: AtomicUsize,
}

impl EndpointRing {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Build from model IDs.
    pub fn from_models<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(models.into_iter().map(Endpoint::new).collect())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Current cursor position. Always `< len()` for a non-empty ring.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Endpoint at `index`, wrapping around.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty.
    pub fn get(&self, index: usize) -> &Endpoint {
        &self.endpoints[index % self.endpoints.len()]
    }

    /// Index following `index`, wrapping around.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.endpoints.len().max(1)
    }

    /// Move the cursor past `failed` if it still points there.
    ///
    /// Returns the index the cursor holds afterwards.
    pub fn advance_from(&self, failed: usize) -> usize {
        let next = self.next_index(failed);
        match self
            .cursor
            .compare_exchange(failed, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => next,
            Err(current) => current,
        }
    }
}
