//! Per-document error taxonomy
//!
//! None of these abort a batch. The orchestrator converts each one into a
//! [`ProcessingFailure`] attached to the document that produced it.

use thiserror::Error;

/// Text acquisition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Zero-length payload; the decoder was never invoked
    #[error("Empty input: document has no bytes")]
    EmptyInput,

    /// The decoder could not produce text
    #[error("Could not extract text: {0}")]
    DecodeFailed(String),
}

/// Oracle call failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// A single attempt exceeded the per-call timeout
    #[error("Oracle call timed out")]
    Timeout,

    /// Transient service failure (rate limit, overload, transport)
    #[error("Oracle service error: {0}")]
    ServiceError(String),

    /// Permanent refusal (bad request, auth, content policy); never retried
    #[error("Oracle rejected the request: {0}")]
    Rejected(String),

    /// The oracle answered with blank text
    #[error("Oracle returned an empty response")]
    EmptyResponse,

    /// All attempts failed transiently
    #[error("Oracle unavailable after {attempts} attempt(s): {last}")]
    Unavailable {
        /// Number of attempts made
        attempts: u32,
        /// Description of the last failure
        last: String,
    },
}

impl OracleError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OracleError::Timeout | OracleError::ServiceError(_) | OracleError::EmptyResponse
        )
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::Timeout => "timeout",
            OracleError::ServiceError(_) => "service_error",
            OracleError::Rejected(_) => "rejected",
            OracleError::EmptyResponse => "empty_response",
            OracleError::Unavailable { .. } => "unavailable",
        }
    }
}

/// Oracle output that did not follow the answer contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// None of the schema labels were recognized
    #[error("Malformed oracle response: {0}")]
    Malformed(String),
}

/// Terminal failure of one document's pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingFailure {
    /// Text extraction failed
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),

    /// The oracle failed after the retry policy ran out
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    /// The oracle response could not be parsed
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
}

impl ProcessingFailure {
    /// Pipeline stage where the failure originated
    pub fn stage(&self) -> crate::FailureStage {
        match self {
            ProcessingFailure::Extraction(_) => crate::FailureStage::Extraction,
            ProcessingFailure::Oracle(_) => crate::FailureStage::Oracle,
            ProcessingFailure::Parse(_) => crate::FailureStage::Parse,
        }
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingFailure::Extraction(ExtractionError::EmptyInput) => "empty_input",
            ProcessingFailure::Extraction(ExtractionError::DecodeFailed(_)) => "decode_failed",
            ProcessingFailure::Oracle(e) => e.kind(),
            ProcessingFailure::Parse(ParseError::Malformed(_)) => "malformed",
        }
    }
}
