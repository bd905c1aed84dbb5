//! Caching subsystem.
//!
//! [`response::ResponseCache`] memoizes final answers by exact question
//! text for a fixed TTL. It sits in front of the
//! [`ResponsePolicy`](crate::policy::ResponsePolicy): a hit bypasses the
//! upstream client, the quality filter and the fallback responder entirely.

pub mod response;

pub use response::{CacheConfig, ResponseCache};
