//! Oracle client with timeout and retry policy

use crate::config::ExtractorConfig;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use waybill_domain::traits::{GenerationError, TextGenerator};
use waybill_domain::{OracleError, Prompt};

/// Attempt budget, per-call timeout and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first
    pub max_attempts: u32,

    /// Bound on a single attempt
    pub call_timeout: Duration,

    /// Backoff before the second attempt
    pub base_backoff: Duration,

    /// Upper bound on any backoff
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Take the retry settings from an extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            call_timeout: config.call_timeout(),
            base_backoff: config.base_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Backoff after failed attempt `attempt` (1-based)
    ///
    /// `base * 2^(attempt-1)`, capped at `max_backoff`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

/// Sends prompts to the oracle and applies the retry policy
///
/// Every call ends in a typed result: the response text, a permanent
/// `Rejected`, or `Unavailable` once transient failures use up the budget.
pub struct OracleClient<G> {
    generator: G,
    policy: RetryPolicy,
}

impl<G: TextGenerator> OracleClient<G> {
    /// Create a client
    pub fn new(generator: G, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    /// Active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Model name of the underlying generator
    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Call the oracle, retrying transient failures
    pub async fn call(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last = OracleError::EmptyResponse;

        for attempt in 1..=attempts {
            debug!("Oracle attempt {}/{} ({})", attempt, attempts, self.model_name());

            match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if !e.is_transient() => {
                    debug!("Oracle rejected request: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Oracle attempt {}/{} failed: {}", attempt, attempts, e);
                    last = e;
                }
            }

            if attempt < attempts {
                sleep(self.policy.backoff_after(attempt)).await;
            }
        }

        Err(OracleError::Unavailable {
            attempts,
            last: last.to_string(),
        })
    }

    async fn attempt(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let call_timeout = self.policy.call_timeout;
        let text = timeout(call_timeout, self.generator.generate(prompt, call_timeout))
            .await
            .map_err(|_| OracleError::Timeout)?
            .map_err(|e| match e {
                GenerationError::Timeout => OracleError::Timeout,
                GenerationError::Transient(msg) => OracleError::ServiceError(msg),
                GenerationError::Permanent(msg) => OracleError::Rejected(msg),
            })?;

        if text.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_llm::MockProvider;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            call_timeout: Duration::from_millis(200),
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    fn prompt() -> Prompt {
        Prompt::new("system", "document")
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            call_timeout: Duration::from_secs(1),
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(3000),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(3000));
        assert_eq!(policy.backoff_after(40), Duration::from_millis(3000));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.call_timeout, Duration::from_secs(60));
        assert_eq!(policy.base_backoff, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let provider = MockProvider::new("Order ID: 1");
        let client = OracleClient::new(provider.clone(), fast_policy(3));

        assert_eq!(client.call(&prompt()).await.unwrap(), "Order ID: 1");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let provider = MockProvider::new("unused");
        provider.push_outcome(Err(GenerationError::Transient("503".into())));
        provider.push_outcome(Err(GenerationError::Transient("529".into())));
        provider.push_outcome(Ok("Order ID: third".into()));
        let client = OracleClient::new(provider.clone(), fast_policy(3));

        assert_eq!(client.call(&prompt()).await.unwrap(), "Order ID: third");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_all_attempts_transient_is_unavailable() {
        let provider = MockProvider::new("unused");
        for _ in 0..3 {
            provider.push_outcome(Err(GenerationError::Transient("overloaded".into())));
        }
        let client = OracleClient::new(provider.clone(), fast_policy(3));

        match client.call(&prompt()).await {
            Err(OracleError::Unavailable { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.contains("overloaded"));
            }
            other => panic!("Expected Unavailable, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let provider = MockProvider::new("unused");
        provider.push_outcome(Err(GenerationError::Permanent("invalid x-api-key".into())));
        let client = OracleClient::new(provider.clone(), fast_policy(3));

        let result = client.call(&prompt()).await;
        assert_eq!(
            result,
            Err(OracleError::Rejected("invalid x-api-key".into()))
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_response_is_retried() {
        let provider = MockProvider::new("Courier Name: UPS");
        provider.push_outcome(Ok("   \n".into()));
        let client = OracleClient::new(provider.clone(), fast_policy(3));

        assert_eq!(client.call(&prompt()).await.unwrap(), "Courier Name: UPS");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_slow_generator_times_out() {
        let provider = MockProvider::new("too late").with_delay(Duration::from_secs(5));
        let client = OracleClient::new(provider.clone(), fast_policy(2));

        match client.call(&prompt()).await {
            Err(OracleError::Unavailable { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last, OracleError::Timeout.to_string());
            }
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }
}
