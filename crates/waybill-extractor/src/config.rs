//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use waybill_domain::SchemaField;
use waybill_gatekeeper::ValidationConfig;

/// Configuration for the extraction pipeline and batch runner
///
/// Passed by value into each component at construction; nothing reads
/// configuration from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Oracle attempts per document, including the first
    pub max_attempts: u32,

    /// Maximum time for a single oracle call (seconds)
    pub call_timeout_secs: u64,

    /// Backoff before the second attempt (milliseconds); doubles each retry
    pub base_backoff_ms: u64,

    /// Upper bound on a single backoff (milliseconds)
    pub max_backoff_ms: u64,

    /// Overall batch deadline (seconds); unfinished documents become Cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_deadline_secs: Option<u64>,

    /// Documents processed concurrently
    pub max_concurrency: usize,

    /// Time in-flight documents get to finish after cancellation (seconds)
    pub cancel_grace_secs: u64,

    /// Maximum document text length (characters); longer text is truncated
    pub max_text_length: usize,

    /// Extra label synonyms, keyed by canonical field label
    pub extra_labels: BTreeMap<String, Vec<String>>,

    /// Field validation rules
    pub validation: ValidationConfig,
}

impl ExtractorConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get the base backoff as a Duration
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    /// Get the backoff cap as a Duration
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Get the batch deadline as a Duration, if set
    pub fn batch_deadline(&self) -> Option<Duration> {
        self.batch_deadline_secs.map(Duration::from_secs)
    }

    /// Get the cancellation grace period as a Duration
    pub fn cancel_grace(&self) -> Duration {
        Duration::from_secs(self.cancel_grace_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_attempts == 0 {
            return Err(ExtractorError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_backoff_ms < self.base_backoff_ms {
            return Err(ExtractorError::Config(
                "max_backoff_ms cannot be less than base_backoff_ms".to_string(),
            ));
        }
        if self.batch_deadline_secs == Some(0) {
            return Err(ExtractorError::Config(
                "batch_deadline_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ExtractorError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.max_text_length == 0 {
            return Err(ExtractorError::Config(
                "max_text_length must be greater than 0".to_string(),
            ));
        }
        for (label, synonyms) in &self.extra_labels {
            if SchemaField::parse(label).is_none() {
                return Err(ExtractorError::Config(format!(
                    "extra_labels: unknown field '{}'",
                    label
                )));
            }
            if synonyms.iter().any(|s| s.trim().is_empty()) {
                return Err(ExtractorError::Config(format!(
                    "extra_labels: empty synonym for '{}'",
                    label
                )));
            }
        }
        self.validation.validate()?;
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_attempts: 3,
            call_timeout_secs: 60,
            base_backoff_ms: 1_000,
            max_backoff_ms: 8_000,
            batch_deadline_secs: None,
            max_concurrency: 4,
            cancel_grace_secs: 30,
            max_text_length: 50_000,
            extra_labels: BTreeMap::new(),
            validation: ValidationConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fewer retries, shorter timeouts, more parallelism
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            call_timeout_secs: 30,
            base_backoff_ms: 500,
            max_backoff_ms: 2_000,
            max_concurrency: 8,
            cancel_grace_secs: 5,
            max_text_length: 20_000,
            ..Self::default()
        }
    }

    /// Lenient preset: more retries, longer timeouts, permissive validation
    pub fn lenient() -> Self {
        Self {
            max_attempts: 5,
            call_timeout_secs: 120,
            base_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            max_concurrency: 2,
            cancel_grace_secs: 60,
            max_text_length: 100_000,
            validation: ValidationConfig::permissive(),
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Toml(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Toml(format!("Failed to serialize to TOML: {}", e)))
    }
}
