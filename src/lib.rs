//! Chatty - question-answering relay for Metropolia's Urban Farm Lab
//!
//! Questions are answered by a hosted text-generation model (HuggingFace
//! Inference API) when it produces something usable, and by a deterministic
//! keyword table otherwise. Final answers are memoized by exact question
//! text for a fixed TTL.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chatty::{
//!     CacheConfig, EndpointRing, FallbackResponder, HuggingFaceClient, QualityFilter,
//!     ResponseCache, ResponsePolicy, UpstreamClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> chatty::Result<()> {
//!     let provider = Arc::new(HuggingFaceClient::new("hf_your_key")?);
//!     let ring = Arc::new(EndpointRing::from_models(["google/flan-t5-xl", "gpt2"]));
//!
//!     let policy = ResponsePolicy::new(
//!         ResponseCache::new(&CacheConfig::default()),
//!         Some(UpstreamClient::new(provider, ring)),
//!         FallbackResponder::default(),
//!         QualityFilter::default(),
//!     );
//!
//!     let answer = policy.answer(Some("What is Urban Farm Lab?")).await?;
//!     println!("[{}] {}", answer.source.as_str(), answer.text);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod fallback;
pub mod policy;
pub mod prompt;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use error::{ChattyError, Result};
pub use fallback::{FallbackResponder, FixedPicker, PhrasePicker, RandomPicker, RuleTable};
pub use policy::{QualityFilter, ResponsePolicy};
pub use prompt::PromptTemplate;
pub use providers::{Endpoint, EndpointRing, GenerateProvider, HuggingFaceClient, UpstreamClient};
pub use types::{Answer, GenerationParams, Question, Source};
pub use version::{PKG_VERSION, SERVICE_NAME, version_string};
