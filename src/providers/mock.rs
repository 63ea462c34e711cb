/*!
 * Mock provider for testing.
 *
 * The mock answers from a queue of scripted replies first and falls back to
 * a fixed behavior once the queue is empty:
 * - `MockProvider::echo()` - Answers with well-formed JSON built from the prompt
 * - `MockProvider::fixed(text)` - Always answers with the same text
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::rate_limited()` - Always reports a rate limit
 */

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::CompletionProvider;

/// A scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with `RateLimitExceeded`
    RateLimited,
    /// Fail with `ApiError` and this status
    ApiFailure(u16),
    /// Fail with `ConnectionError`
    ConnectionFailure,
    /// Fail with `AuthenticationError`
    Unauthorized,
}

/// Behavior once the script is exhausted
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Translate every node to `prefix + text` (or keep the translation for improve prompts)
    Echo { prefix: String },
    /// Repeat one reply forever
    Repeat(MockReply),
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Replies served before the fallback behavior
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Behavior once the script is empty
    behavior: MockBehavior,
    /// Number of calls made
    request_count: Arc<AtomicUsize>,
    /// Prompts received, in call order
    prompts: Arc<Mutex<Vec<(String, String)>>>,
    /// Custom delay generator, from the user prompt
    delay: Option<fn(&str) -> u64>,
}

impl MockProvider {
    /// Create a new mock provider with the specified fallback behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Echo node texts back with a `[TRANSLATED] ` prefix
    pub fn echo() -> Self {
        Self::echo_with_prefix("[TRANSLATED] ")
    }

    /// Echo node texts back with the given prefix
    pub fn echo_with_prefix(prefix: &str) -> Self {
        Self::new(MockBehavior::Echo {
            prefix: prefix.to_string(),
        })
    }

    /// Always answer with `text`
    pub fn fixed(text: &str) -> Self {
        Self::new(MockBehavior::Repeat(MockReply::Text(text.to_string())))
    }

    /// Always fail with a server error
    pub fn failing() -> Self {
        Self::new(MockBehavior::Repeat(MockReply::ApiFailure(500)))
    }

    /// Always report a rate limit
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::Repeat(MockReply::RateLimited))
    }

    /// Serve these replies, in order, before falling back
    pub fn with_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        self.lock_script().extend(replies);
        self
    }

    /// Serve these texts, in order, before falling back
    pub fn with_texts<S: Into<String>>(self, texts: impl IntoIterator<Item = S>) -> Self {
        self.with_replies(texts.into_iter().map(|t| MockReply::Text(t.into())))
    }

    /// Sleep before answering, for a duration computed from the user prompt
    pub fn with_delay(mut self, delay: fn(&str) -> u64) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// System and user prompts received so far
    pub fn recorded_prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Build the JSON reply that echoes every node of a paragraph
    pub fn echo_response(paragraph_nodes: &[(usize, &str)], prefix: &str) -> String {
        let nodes: Vec<Value> = paragraph_nodes
            .iter()
            .map(|(index, text)| json!({"index": index, "translation": format!("{}{}", prefix, text)}))
            .collect();
        let paragraph: String = paragraph_nodes
            .iter()
            .map(|(_, text)| format!("{}{}", prefix, text))
            .collect();
        json!({"paragraph": paragraph, "nodes": nodes}).to_string()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<MockReply>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_reply(&self, user: &str) -> MockReply {
        if let Some(reply) = self.lock_script().pop_front() {
            return reply;
        }
        match &self.behavior {
            MockBehavior::Echo { prefix } => MockReply::Text(echo_prompt(user, prefix)),
            MockBehavior::Repeat(reply) => reply.clone(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            prompts: Arc::clone(&self.prompts),
            delay: self.delay,
        }
    }
}

/// Reply to a rendered prompt by echoing its input block.
fn echo_prompt(user: &str, prefix: &str) -> String {
    let input = user
        .rfind("Input:\n")
        .map(|i| &user[i + "Input:\n".len()..])
        .map(|rest| rest.rfind("\nOutput:").map_or(rest, |end| &rest[..end]))
        .and_then(|block| serde_json::from_str::<Value>(block).ok());

    let Some(input) = input else {
        return json!({"paragraph": "", "nodes": []}).to_string();
    };

    let nodes: Vec<(usize, String)> = input["nodes"]
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|node| {
                    let index = node["index"].as_u64()? as usize;
                    // Improve prompts already carry a translation.
                    let text = match node["translation"].as_str() {
                        Some(translation) => translation.to_string(),
                        None => format!("{}{}", prefix, node["text"].as_str().unwrap_or_default()),
                    };
                    Some((index, text))
                })
                .collect()
        })
        .unwrap_or_default();

    let borrowed: Vec<(usize, &str)> = nodes.iter().map(|(i, t)| (*i, t.as_str())).collect();
    MockProvider::echo_response(&borrowed, "")
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((system.to_string(), user.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(Duration::from_millis(delay(user))).await;
        }

        match self.next_reply(user) {
            MockReply::Text(text) => Ok(text),
            MockReply::RateLimited => Err(ProviderError::RateLimitExceeded(format!(
                "Simulated rate limit (request #{})",
                count + 1
            ))),
            MockReply::ApiFailure(status_code) => Err(ProviderError::ApiError {
                status_code,
                message: format!("Simulated provider failure (request #{})", count + 1),
            }),
            MockReply::ConnectionFailure => Err(ProviderError::ConnectionError(
                "Simulated connection reset".to_string(),
            )),
            MockReply::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid key".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
