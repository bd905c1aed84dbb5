//! Generation parameters sent with every upstream request.

use serde::{Deserialize, Serialize};

/// Bounded sampling parameters for text generation.
///
/// Serialized as the `parameters` object of a HuggingFace text-generation
/// request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate.
    pub max_new_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Sample instead of greedy decoding.
    pub do_sample: bool,
    /// Whether the service should echo the prompt before the continuation.
    pub return_full_text: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 150,
            temperature: 0.7,
            do_sample: true,
            return_full_text: false,
        }
    }
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_new_tokens(mut self, n: u32) -> Self {
        self.max_new_tokens = n;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }
}
