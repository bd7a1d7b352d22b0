//! Error types for the Extractor

use thiserror::Error;

/// Batch-level errors of the extractor
///
/// Per-document failures are not errors at this level; they are recorded
/// in the batch result.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse or serialization error
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<waybill_gatekeeper::GatekeeperError> for ExtractorError {
    fn from(e: waybill_gatekeeper::GatekeeperError) -> Self {
        match e {
            waybill_gatekeeper::GatekeeperError::Config(msg) => ExtractorError::Config(msg),
        }
    }
}
