//! Telemetry metric name constants.
//!
//! Centralised metric names for chatty operations. The daemon (or an
//! embedding application) installs its own `metrics` recorder; without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `chatty_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `source` — where an answer came from ("cache", "upstream", ...)
//! - `model` — upstream model name
//! - `status` — outcome: "ok" or an error kind
//! - `reason` — why the fallback responder was used

/// Total answered questions.
///
/// Labels: `source`.
pub const REQUESTS_TOTAL: &str = "chatty_requests_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "chatty_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "chatty_cache_misses_total";

/// Total upstream attempts, one per endpoint tried.
///
/// Labels: `model`, `status`.
pub const UPSTREAM_ATTEMPTS_TOTAL: &str = "chatty_upstream_attempts_total";

/// Upstream request duration in seconds.
///
/// Labels: `model`.
pub const UPSTREAM_DURATION_SECONDS: &str = "chatty_upstream_duration_seconds";

/// Total cursor advances after a transient failure.
///
/// Labels: `model` (the endpoint rotated away from).
pub const ENDPOINT_ROTATIONS_TOTAL: &str = "chatty_endpoint_rotations_total";

/// Total answers served by the keyword fallback responder.
///
/// Labels: `reason` ("no_upstream" | "rejected" | "empty" | "internal").
pub const FALLBACKS_TOTAL: &str = "chatty_fallbacks_total";
