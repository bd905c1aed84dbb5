//! Tests for UpstreamClient endpoint rotation using a scripted provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatty::providers::{Endpoint, EndpointRing, GenerateProvider, UpstreamClient};
use chatty::{ChattyError, GenerationParams, Result};

// ============================================================================
// Scripted provider
// ============================================================================

/// Replays a queue of outcomes and records which model each call went to.
#[derive(Default)]
struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    fn new(outcomes: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl GenerateProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        endpoint: &Endpoint,
        _params: &GenerationParams,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.model.clone(), prompt.to_string()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ChattyError::EmptyResponse))
    }
}

fn loading() -> Result<String> {
    Err(ChattyError::ModelLoading {
        estimated_time: None,
    })
}

fn ring() -> Arc<EndpointRing> {
    Arc::new(EndpointRing::from_models(["model/a", "model/b", "model/c"]))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn success_extracts_answer_after_marker() {
    let provider = ScriptedProvider::new(vec![Ok(
        "Answer: We grow lettuce on the roof. Answer: and more".to_string(),
    )]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    let answer = client.query("What do you grow?").await;

    assert_eq!(answer.as_deref(), Some("We grow lettuce on the roof."));
    assert_eq!(provider.models_called(), vec!["model/a"]);
    assert_eq!(ring.cursor(), 0);
}

#[tokio::test]
async fn prompt_embeds_the_question() {
    let provider = ScriptedProvider::new(vec![Ok("Fine answer text".to_string())]);
    let client = UpstreamClient::new(provider.clone(), ring());

    client.query("Can I visit the lab?").await;

    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains("User Question: \"Can I visit the lab?\""));
    assert!(prompt.trim_end().ends_with("Answer:"));
}

#[tokio::test]
async fn transient_failure_rotates_to_next_endpoint() {
    let provider = ScriptedProvider::new(vec![loading(), Ok("Answer: Second works".to_string())]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    let answer = client.query("Hello").await;

    assert_eq!(answer.as_deref(), Some("Second works"));
    assert_eq!(provider.models_called(), vec!["model/a", "model/b"]);
    assert_eq!(ring.cursor(), 1);
}

#[tokio::test]
async fn rate_limit_and_503_are_transient() {
    let provider = ScriptedProvider::new(vec![
        Err(ChattyError::RateLimited { retry_after: None }),
        Err(ChattyError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        }),
        Ok("Third time lucky".to_string()),
    ]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    let answer = client.query("Hello").await;

    assert_eq!(answer.as_deref(), Some("Third time lucky"));
    assert_eq!(provider.models_called(), vec!["model/a", "model/b", "model/c"]);
    assert_eq!(ring.cursor(), 2);
}

#[tokio::test]
async fn all_endpoints_transient_yields_none() {
    let provider = ScriptedProvider::new(vec![loading(), loading(), loading()]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    assert!(client.query("Hello").await.is_none());
    // One attempt per endpoint, no more.
    assert_eq!(provider.models_called().len(), 3);
    // Cursor wrapped all the way around.
    assert_eq!(ring.cursor(), 0);
}

#[tokio::test]
async fn permanent_failure_stops_immediately() {
    for err in [
        ChattyError::AuthenticationFailed,
        ChattyError::Timeout,
        ChattyError::Http("connection refused".to_string()),
        ChattyError::ModelNotFound("model/a".to_string()),
        ChattyError::EmptyResponse,
    ] {
        let provider = ScriptedProvider::new(vec![Err(err), Ok("never used".to_string())]);
        let ring = ring();
        let client = UpstreamClient::new(provider.clone(), ring.clone());

        assert!(client.query("Hello").await.is_none());
        assert_eq!(provider.models_called(), vec!["model/a"]);
        assert_eq!(ring.cursor(), 0);
    }
}

#[tokio::test]
async fn next_request_starts_at_advanced_cursor() {
    let provider = ScriptedProvider::new(vec![
        loading(),
        Ok("From b".to_string()),
        Ok("Also from b".to_string()),
    ]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    client.query("first").await;
    let second = client.query("second").await;

    assert_eq!(second.as_deref(), Some("Also from b"));
    assert_eq!(provider.models_called(), vec!["model/a", "model/b", "model/b"]);
}

#[tokio::test]
async fn rotation_wraps_from_last_endpoint_to_first() {
    let provider = ScriptedProvider::new(vec![
        loading(),
        loading(),
        Ok("From c".to_string()),
        loading(),
        Ok("Wrapped to a".to_string()),
    ]);
    let ring = ring();
    let client = UpstreamClient::new(provider.clone(), ring.clone());

    client.query("first").await;
    assert_eq!(ring.cursor(), 2);

    let answer = client.query("second").await;

    assert_eq!(answer.as_deref(), Some("Wrapped to a"));
    assert_eq!(
        provider.models_called(),
        vec!["model/a", "model/b", "model/c", "model/c", "model/a"]
    );
    assert_eq!(ring.cursor(), 0);
}

#[tokio::test]
async fn empty_answer_is_still_some() {
    let provider = ScriptedProvider::new(vec![Ok("   \n".to_string())]);
    let client = UpstreamClient::new(provider, ring());

    // The caller decides what to do with blank text.
    assert_eq!(client.query("Hello").await.as_deref(), Some(""));
}

#[tokio::test]
async fn empty_ring_never_calls_provider() {
    let provider = ScriptedProvider::new(vec![Ok("unused".to_string())]);
    let client = UpstreamClient::new(provider.clone(), Arc::new(EndpointRing::new(Vec::new())));

    assert!(client.query("Hello").await.is_none());
    assert!(provider.models_called().is_empty());
}

#[tokio::test]
async fn probe_asks_the_fixed_question() {
    let provider = ScriptedProvider::new(vec![Ok("A city farm.".to_string())]);
    let client = UpstreamClient::new(provider.clone(), ring());

    assert_eq!(client.probe().await.as_deref(), Some("A city farm."));
    assert!(provider.last_prompt().unwrap().contains(chatty::providers::PROBE_QUESTION));
}
