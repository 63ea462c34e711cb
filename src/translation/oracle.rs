/*!
 * Translation oracle adapter.
 *
 * Renders prompts for a paragraph unit and sends them to the completion
 * provider. Transport failures are retried here with exponential backoff;
 * rate-limit and other non-retryable errors are returned at once so the
 * caller decides what to do with them. Replies are returned verbatim.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{error, warn};

use crate::errors::ProviderError;
use crate::providers::CompletionProvider;
use crate::translation::fragments::ParagraphUnit;
use crate::translation::prompts::{Prompt, PromptBuilder, PromptKind};
use crate::translation::sanitizer::TranslatedUnit;

/// Transport retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, at least one
    pub retry_limit: u32,
    /// Delay before the second attempt, doubled after each failure
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub fn new(retry_limit: u32, backoff_base_ms: u64) -> Self {
        Self {
            retry_limit: retry_limit.max(1),
            backoff_base_ms,
        }
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}

/// Sends rendered prompts to a completion provider.
#[derive(Debug, Clone)]
pub struct Oracle {
    provider: Arc<dyn CompletionProvider>,
    prompts: PromptBuilder,
    retry: RetryPolicy,
}

impl Oracle {
    pub fn new(provider: Arc<dyn CompletionProvider>, prompts: PromptBuilder, retry: RetryPolicy) -> Self {
        Self {
            provider,
            prompts,
            retry,
        }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Ask for a translation of `unit`.
    pub async fn translate(&self, kind: PromptKind, unit: &ParagraphUnit) -> Result<String, ProviderError> {
        let prompt = self.prompts.translate(kind, unit);
        self.ask(&prompt, unit.position).await
    }

    /// Ask to rework a first-pass translation of `unit`.
    pub async fn improve(&self, unit: &ParagraphUnit, first_pass: &TranslatedUnit) -> Result<String, ProviderError> {
        let prompt = self.prompts.improve(unit, first_pass);
        self.ask(&prompt, unit.position).await
    }

    /// Send a prompt, retrying transport failures.
    pub async fn ask(&self, prompt: &Prompt, position: usize) -> Result<String, ProviderError> {
        let mut attempt = 1;
        loop {
            match self.provider.complete(&prompt.system, &prompt.user).await {
                Ok(text) => return Ok(text),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= self.retry.retry_limit => {
                    error!(
                        "Paragraph {}: {} request failed after {} attempts: {}",
                        position,
                        self.provider.name(),
                        attempt,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "Paragraph {}: {} request failed (attempt {}/{}), retrying in {:?}: {}",
                        position,
                        self.provider.name(),
                        attempt,
                        self.retry.retry_limit,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
