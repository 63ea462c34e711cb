/*!
 * Completion providers backing the translation oracle.
 *
 * This module contains:
 * - `CompletionProvider`: the one capability the pipeline needs
 * - OpenAI: OpenAI-compatible chat completions (also used for LM Studio)
 * - Mock: scripted provider for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Text completion from a system and a user instruction
///
/// Implementations return the model's reply verbatim; interpreting it is the
/// caller's job.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Complete a request
    ///
    /// # Arguments
    /// * `system` - Role instruction
    /// * `user` - Task instruction
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw reply text or an error
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

pub mod mock;
pub mod openai;
