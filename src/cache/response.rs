//! Expiring answer cache keyed by question text.
//!
//! Keys are the trimmed question exactly as asked, so "Hello" and "hello"
//! are distinct entries. Values are final answer texts from any source
//! (upstream or fallback); the source tag is not stored because every
//! replay is reported as `cache`.
//!
//! Expiry is checked on read, so an entry past its TTL is never returned
//! even before moka's maintenance pass purges it. Re-inserting a key
//! replaces the value and restarts its TTL.

use std::time::Duration;

use moka::future::Cache;

use crate::telemetry;

/// Configuration for the response cache.
///
/// ```rust
/// # use chatty::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// In-memory TTL cache of final answers.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, String>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            cache,
            ttl: config.ttl,
        }
    }

    /// Look up a cached answer.
    ///
    /// Returns `None` on a miss or when the entry has expired. Emits cache
    /// hit/miss metrics.
    pub async fn get(&self, question: &str) -> Option<String> {
        match self.cache.get(question).await {
            Some(answer) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(answer)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert (or overwrite) an answer with a fresh TTL.
    pub async fn insert(&self, question: &str, answer: impl Into<String>) {
        self.cache.insert(question.to_string(), answer.into()).await;
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live entries.
    ///
    /// Runs pending maintenance first so expired entries are not counted.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict all entries.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
