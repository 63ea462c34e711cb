use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ProviderError;
use crate::providers::CompletionProvider;
use crate::translation::sanitizer::RATE_LIMIT_MARKER;

/// Default endpoint of the hosted API
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions client
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Bearer key, empty for local servers
    api_key: String,
    /// Base URL, `/chat/completions` is appended
    endpoint: String,
    /// Model identifier
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,
    /// The conversation so far
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl ChatCompletionRequest {
    /// Create a request with a system and a user message
    pub fn new(model: impl Into<String>, system: &str, user: &str) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAI {
    /// Create a new client
    ///
    /// An empty `endpoint` selects the hosted API.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint,
            model: model.into(),
            temperature,
        })
    }

    /// URL of the chat completions route
    pub fn completions_url(&self) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}/chat/completions", self.endpoint))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", self.endpoint, e)))
    }

    /// Send a chat completion request
    pub async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, ProviderError> {
        let url = self.completions_url()?;
        let mut builder = self.client.post(url).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ProviderError::ConnectionError(e.to_string())
            } else {
                ProviderError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!("OpenAI API error ({}): {}", status, body);
            return Err(map_error_status(status, &body));
        }

        serde_json::from_str::<ChatCompletionResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse chat completion: {}", e)))
    }

    /// Text of the first choice
    pub fn extract_text(response: &ChatCompletionResponse) -> Result<String, ProviderError> {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::ParseError("Response contained no choices".to_string()))
    }
}

/// Classify a non-success reply.
pub fn map_error_status(status: StatusCode, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let code = envelope.as_ref().and_then(|e| e.error.code.as_deref());

    if status == StatusCode::TOO_MANY_REQUESTS || code == Some(RATE_LIMIT_MARKER) {
        return ProviderError::RateLimitExceeded(message);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ProviderError::AuthenticationError(message);
    }
    ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest::new(&self.model, system, user).temperature(self.temperature);
        debug!("Sending chat completion to {} with model {}", self.endpoint, self.model);
        let response = self.send(&request).await?;
        Self::extract_text(&response)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
