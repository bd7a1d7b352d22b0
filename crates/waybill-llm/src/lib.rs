//! Waybill LLM Provider Layer
//!
//! Implementations of the `TextGenerator` capability from `waybill-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic, scriptable provider for testing
//! - `AnthropicProvider`: Anthropic Messages API over HTTP
//!
//! Providers only classify failures (timeout, transient, permanent). Retry
//! policy belongs to the extractor's oracle client.
//!
//! # Examples
//!
//! ```
//! use waybill_llm::MockProvider;
//! use waybill_domain::Prompt;
//! use waybill_domain::traits::TextGenerator;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Order ID: 42");
//! let prompt = Prompt::new("system", "user");
//! let result = provider.generate(&prompt, Duration::from_secs(1)).await.unwrap();
//! assert_eq!(result, "Order ID: 42");
//! # });
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use waybill_domain::traits::{GenerationError, TextGenerator};
use waybill_domain::Prompt;

pub use anthropic::AnthropicProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or transport error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status from the API
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body or reason
        message: String,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Well-formed response without any answer text
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl LlmError {
    /// Map to the retry classification used by the oracle client
    pub fn classify(&self) -> GenerationError {
        match self {
            LlmError::Timeout => GenerationError::Timeout,
            LlmError::Communication(_) | LlmError::EmptyResponse(_) => {
                GenerationError::Transient(self.to_string())
            }
            LlmError::Api { status, .. } if is_transient_status(*status) => {
                GenerationError::Transient(self.to_string())
            }
            LlmError::Api { .. } | LlmError::Config(_) | LlmError::InvalidResponse(_) => {
                GenerationError::Permanent(self.to_string())
            }
        }
    }
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        e.classify()
    }
}

/// Whether an HTTP status is worth retrying
///
/// 408 (request timeout), 409 (conflict), 429 (rate limit) and any 5xx,
/// including Anthropic's 529 "overloaded".
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 409 | 429) || (500..600).contains(&status)
}

/// Scripted outcome for one mock call
pub type MockOutcome = Result<String, GenerationError>;

/// Mock LLM provider for deterministic testing
///
/// Outcomes are chosen in this order:
/// 1. the next entry of the script queue, if any
/// 2. the first registered response whose key occurs in the user prompt
/// 3. the default response
///
/// # Examples
///
/// ```
/// use waybill_llm::MockProvider;
/// use waybill_domain::traits::{GenerationError, TextGenerator};
/// use waybill_domain::Prompt;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::new("default");
/// provider.push_outcome(Err(GenerationError::Transient("503".into())));
/// let prompt = Prompt::new("s", "u");
///
/// assert!(provider.generate(&prompt, Duration::from_secs(1)).await.is_err());
/// assert_eq!(provider.generate(&prompt, Duration::from_secs(1)).await.unwrap(), "default");
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockOutcome)>>>,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    delay: Duration,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            delay: Duration::ZERO,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Sleep this long before answering any prompt
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Respond with `response` to prompts whose user text contains `needle`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((needle.into(), Ok(response.into())));
    }

    /// Fail prompts whose user text contains `needle`
    pub fn add_error(&self, needle: impl Into<String>, error: GenerationError) {
        lock(&self.responses).push((needle.into(), Err(error)));
    }

    /// Sleep for `delay` before answering prompts containing `needle`
    pub fn add_delay(&self, needle: impl Into<String>, delay: Duration) {
        lock(&self.delays).insert(needle.into(), delay);
    }

    /// Queue an outcome for the next unscripted call
    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    fn delay_for(&self, user: &str) -> Duration {
        lock(&self.delays)
            .iter()
            .filter(|(needle, _)| user.contains(needle.as_str()))
            .map(|(_, d)| *d)
            .max()
            .unwrap_or(self.delay)
    }

    fn outcome_for(&self, user: &str) -> MockOutcome {
        if let Some(outcome) = lock(&self.script).pop_front() {
            return outcome;
        }
        lock(&self.responses)
            .iter()
            .find(|(needle, _)| user.contains(needle.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl TextGenerator for MockProvider {
    async fn generate(
        &self,
        prompt: &Prompt,
        _timeout: Duration,
    ) -> Result<String, GenerationError> {
        *lock(&self.call_count) += 1;

        let delay = self.delay_for(&prompt.user);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.outcome_for(&prompt.user)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// A poisoned mock lock only happens after a panicking test; keep the data.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
