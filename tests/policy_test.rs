//! End-to-end tests for ResponsePolicy: cache, upstream, quality filter and
//! fallback working together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chatty::fallback::{KeywordMatch, KeywordRule};
use chatty::providers::{Endpoint, EndpointRing, GenerateProvider, UpstreamClient};
use chatty::{
    CacheConfig, ChattyError, FallbackResponder, FixedPicker, GenerationParams, QualityFilter,
    ResponseCache, ResponsePolicy, Result, RuleTable, Source,
};

// ============================================================================
// Test providers
// ============================================================================

/// Always returns the same outcome and counts calls.
struct CountingProvider {
    reply: std::result::Result<String, fn() -> ChattyError>,
    calls: AtomicUsize,
}

impl CountingProvider {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(make: fn() -> ChattyError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(make),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerateProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn generate(&self, _: &str, _: &Endpoint, _: &GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

struct PanickingProvider;

#[async_trait]
impl GenerateProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn generate(&self, _: &str, _: &Endpoint, _: &GenerationParams) -> Result<String> {
        panic!("provider exploded");
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn upstream(provider: Arc<dyn GenerateProvider>) -> UpstreamClient {
    UpstreamClient::new(
        provider,
        Arc::new(EndpointRing::from_models(["model/a", "model/b"])),
    )
}

fn policy_with(upstream: Option<UpstreamClient>, cache: ResponseCache) -> ResponsePolicy {
    ResponsePolicy::new(
        cache,
        upstream,
        FallbackResponder::new(RuleTable::urban_farm_lab(), Arc::new(FixedPicker(0))),
        QualityFilter::default(),
    )
}

fn policy(upstream: Option<UpstreamClient>) -> ResponsePolicy {
    policy_with(upstream, ResponseCache::new(&CacheConfig::default()))
}

fn rule_answer(name: &str) -> String {
    RuleTable::urban_farm_lab()
        .rules()
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.answer.clone())
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn unreachable_upstream_falls_back_then_caches() {
    let provider = CountingProvider::failing(|| ChattyError::Http("connection refused".into()));
    let policy = policy(Some(upstream(provider.clone())));

    let first = policy.answer(Some("Hello")).await.unwrap();
    assert_eq!(first.source, Source::Fallback);
    assert_eq!(first.text, rule_answer("greeting"));

    let second = policy.answer(Some("Hello")).await.unwrap();
    assert_eq!(second.source, Source::Cache);
    assert_eq!(second.text, first.text);

    // The cached answer short-circuits the upstream.
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn good_upstream_answer_is_trimmed_and_tagged() {
    let provider = CountingProvider::answering(
        "Answer:   The lab grows herbs with hydroponics.  ",
    );
    let policy = policy(Some(upstream(provider)));

    let answer = policy.answer(Some("How do you grow herbs?")).await.unwrap();

    assert_eq!(answer.source, Source::Upstream);
    assert_eq!(answer.text, "The lab grows herbs with hydroponics.");
}

#[tokio::test]
async fn short_upstream_answer_uses_fallback() {
    let provider = CountingProvider::answering("Yes.");
    let policy = policy(Some(upstream(provider)));

    let answer = policy.answer(Some("Tell me about Andrea")).await.unwrap();

    assert_eq!(answer.source, Source::Fallback);
    assert_eq!(answer.text, rule_answer("staff"));
}

#[tokio::test]
async fn failure_phrase_uses_fallback() {
    let provider = CountingProvider::answering(
        "I'm having trouble connecting to my knowledge base at the moment.",
    );
    let policy = policy(Some(upstream(provider)));

    let answer = policy.answer(Some("Is Metropolia big?")).await.unwrap();

    assert_eq!(answer.source, Source::Fallback);
    assert_eq!(answer.text, rule_answer("university"));
}

#[tokio::test]
async fn no_upstream_configured_uses_fallback() {
    let policy = policy(None);

    let answer = policy.answer(Some("What time is it?")).await.unwrap();

    assert_eq!(answer.source, Source::Fallback);
    assert_eq!(answer.text, RuleTable::urban_farm_lab().defaults()[0]);
}

#[tokio::test]
async fn exhausted_endpoints_use_fallback() {
    let provider = CountingProvider::failing(|| ChattyError::ModelLoading {
        estimated_time: None,
    });
    let policy = policy(Some(upstream(provider.clone())));

    let answer = policy.answer(Some("Any research?")).await.unwrap();

    assert_eq!(answer.source, Source::Fallback);
    assert_eq!(answer.text, rule_answer("research"));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn blank_question_is_rejected_without_caching() {
    let provider = CountingProvider::answering("A perfectly good answer.");
    let cache = ResponseCache::new(&CacheConfig::default());
    let policy = policy_with(Some(upstream(provider.clone())), cache.clone());

    for raw in [None, Some(""), Some("   \t\n")] {
        let err = policy.answer(raw).await.unwrap_err();
        assert!(matches!(err, ChattyError::InvalidInput(ref m) if m == "Question is required"));
    }

    assert_eq!(provider.calls(), 0);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn question_is_trimmed_before_lookup() {
    let policy = policy(None);

    let first = policy.answer(Some("  Hello  ")).await.unwrap();
    let second = policy.answer(Some("Hello")).await.unwrap();

    assert_eq!(first.source, Source::Fallback);
    assert_eq!(second.source, Source::Cache);
}

#[tokio::test]
async fn cache_keys_are_case_sensitive() {
    let policy = policy(None);

    policy.answer(Some("Hello")).await.unwrap();
    let other = policy.answer(Some("hello")).await.unwrap();

    assert_eq!(other.source, Source::Fallback);
}

#[tokio::test]
async fn expired_entry_queries_upstream_again() {
    let provider = CountingProvider::answering("Hydroponic towers on the roof.");
    let cache = ResponseCache::new(&CacheConfig::new().ttl(Duration::from_millis(100)));
    let policy = policy_with(Some(upstream(provider.clone())), cache);

    let first = policy.answer(Some("What do you grow?")).await.unwrap();
    assert_eq!(first.source, Source::Upstream);

    let cached = policy.answer(Some("What do you grow?")).await.unwrap();
    assert_eq!(cached.source, Source::Cache);
    assert_eq!(provider.calls(), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let refreshed = policy.answer(Some("What do you grow?")).await.unwrap();
    assert_eq!(refreshed.source, Source::Upstream);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn panic_during_resolution_yields_error_fallback() {
    let cache = ResponseCache::new(&CacheConfig::default());
    let policy = policy_with(Some(upstream(Arc::new(PanickingProvider))), cache.clone());

    let answer = policy.answer(Some("Hello")).await.unwrap();

    assert_eq!(answer.source, Source::ErrorFallback);
    assert_eq!(answer.text, rule_answer("greeting"));
    // Error answers are not memoized.
    assert!(cache.get("Hello").await.is_none());
}

#[tokio::test]
async fn empty_rule_answer_becomes_default_phrase() {
    let table = RuleTable::new(
        vec![KeywordRule::new("silent", KeywordMatch::any(["quiet"]), "")],
        vec!["Default phrase.".to_string()],
    );
    let policy = ResponsePolicy::new(
        ResponseCache::new(&CacheConfig::default()),
        None,
        FallbackResponder::new(table, Arc::new(FixedPicker(0))),
        QualityFilter::default(),
    );

    let answer = policy.answer(Some("Be quiet")).await.unwrap();

    assert_eq!(answer.text, "Default phrase.");
    assert_eq!(answer.source, Source::Fallback);
}

#[tokio::test]
async fn concurrent_questions_all_get_answers() {
    let provider = CountingProvider::answering("Urban farming keeps food close to people.");
    let policy = Arc::new(policy(Some(upstream(provider))));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let policy = policy.clone();
            tokio::spawn(async move {
                let question = format!("Question number {}", i % 4);
                policy.answer(Some(&question)).await
            })
        })
        .collect();

    for handle in handles {
        let answer = handle.await.unwrap().unwrap();
        assert!(!answer.text.is_empty());
        assert!(matches!(answer.source, Source::Upstream | Source::Cache));
    }

    assert_eq!(policy.cache().len().await, 4);
}
