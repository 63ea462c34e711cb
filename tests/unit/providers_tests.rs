/*!
 * Tests for completion provider implementations
 */

use std::sync::Arc;

use docutrans::errors::ProviderError;
use docutrans::providers::CompletionProvider;
use docutrans::providers::mock::{MockBehavior, MockProvider, MockReply};
use docutrans::providers::openai::OpenAI;

/// The mock serves scripted replies before its fallback
#[tokio::test]
async fn test_mockProvider_withScript_shouldServeRepliesInOrder() {
    let provider = MockProvider::fixed("fallback")
        .with_replies(vec![MockReply::ConnectionFailure, MockReply::Text("first".to_string())]);

    assert!(matches!(provider.complete("s", "u").await, Err(ProviderError::ConnectionError(_))));
    assert_eq!(provider.complete("s", "u").await.unwrap(), "first");
    assert_eq!(provider.complete("s", "u").await.unwrap(), "fallback");
    assert_eq!(provider.request_count(), 3);
}

/// Clones share counters and recorded prompts
#[tokio::test]
async fn test_mockProvider_clone_shouldShareState() {
    let provider = MockProvider::rate_limited();
    let shared: Arc<dyn CompletionProvider> = Arc::new(provider.clone());

    let error = shared.complete("system", "user").await.unwrap_err();

    assert!(error.is_rate_limit());
    assert_eq!(provider.request_count(), 1);
    assert_eq!(provider.recorded_prompts(), vec![("system".to_string(), "user".to_string())]);
}

/// Echo answers with valid JSON for the prompt input
#[tokio::test]
async fn test_mockProvider_echo_shouldTranslateInputNodes() {
    let provider = MockProvider::new(MockBehavior::Echo { prefix: "ES:".to_string() });
    let user = "Example...\nInput:\n{\"paragraph\":\"Hi there\",\"nodes\":[{\"index\":1,\"text\":\"Hi \"},{\"index\":2,\"text\":\"there\"}]}\nOutput:\n";

    let reply = provider.complete("system", user).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&reply).unwrap();

    assert_eq!(json["nodes"][0]["translation"], "ES:Hi ");
    assert_eq!(json["nodes"][1]["index"], 2);
    assert_eq!(json["paragraph"], "ES:Hi ES:there");
}

/// Unreachable servers surface as retryable connection errors
#[tokio::test]
async fn test_openAI_withUnreachableEndpoint_shouldReturnConnectionError() {
    let provider = OpenAI::new("", "http://127.0.0.1:9/v1", "local-model", 0.3, 2).unwrap();

    let error = provider.complete("system", "user").await.unwrap_err();

    assert!(matches!(error, ProviderError::ConnectionError(_)), "got {:?}", error);
    assert!(error.is_retryable());
    assert_eq!(provider.name(), "openai");
}
