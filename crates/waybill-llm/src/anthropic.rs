//! Anthropic Provider Implementation
//!
//! Sends extraction prompts to the Anthropic Messages API.
//!
//! # Features
//!
//! - Async HTTP communication with `reqwest`
//! - Configurable endpoint, model and output token limit
//! - Per-request timeout
//! - HTTP status classification into transient / permanent failures
//!
//! Retries are not performed here; the extractor's oracle client owns the
//! retry and backoff policy.
//!
//! # Examples
//!
//! ```no_run
//! use waybill_llm::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new("sk-ant-...", "claude-3-opus-20240229").unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use waybill_domain::traits::{GenerationError, TextGenerator};
use waybill_domain::Prompt;

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Default output token limit
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    client: reqwest::Client,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Messages API
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key is blank or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        })
    }

    /// Use a different API endpoint (e.g. a proxy)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the output token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send one Messages API request
    ///
    /// # Errors
    ///
    /// - `LlmError::Timeout` if the request exceeds `timeout`
    /// - `LlmError::Communication` on transport failure
    /// - `LlmError::Api` on a non-success status
    /// - `LlmError::InvalidResponse` if the body cannot be decoded
    /// - `LlmError::EmptyResponse` if it decodes but holds no text
    pub async fn send(&self, prompt: &Prompt, timeout: Duration) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.endpoint);

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &prompt.system,
            messages: vec![Message {
                role: "user",
                content: &prompt.user,
            }],
        };

        debug!("POST {} (model: {}, {} prompt chars)", url, self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                }
            })?;

        collect_text(parsed)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

fn collect_text(response: MessagesResponse) -> Result<String, LlmError> {
    let text: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    let text = text.join("\n");
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse(
            "Response contained no text".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    async fn generate(
        &self,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        self.send(prompt, timeout).await.map_err(GenerationError::from)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
