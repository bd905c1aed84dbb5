//! Upstream text-generation providers.
//!
//! - [`GenerateProvider`] is the seam: one attempt against one endpoint.
//! - [`HuggingFaceClient`] implements it over the HuggingFace Inference API.
//! - [`EndpointRing`] holds the ordered model list and the shared cursor.
//! - [`UpstreamClient`] renders the prompt and drives rotation.

pub mod endpoints;
pub mod huggingface;
pub mod traits;
pub mod upstream;

pub use endpoints::{DEFAULT_MODELS, Endpoint, EndpointRing};
pub use huggingface::HuggingFaceClient;
pub use traits::GenerateProvider;
pub use upstream::{PROBE_QUESTION, UpstreamClient};
