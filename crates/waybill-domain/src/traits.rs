//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates.

use crate::document::Prompt;
use crate::record::RecordStatus;
use crate::schema::SchemaField;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Trait for decoding a document payload into plain text
///
/// Implemented by the infrastructure layer (waybill-extractor's PDF decoder)
pub trait TextExtractor {
    /// Error type for decoding; only its message is kept
    type Error: fmt::Display;

    /// Decode the payload into text
    fn extract_text(&self, bytes: &[u8]) -> Result<String, Self::Error>;
}

/// Failure classification reported by a text generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The call exceeded its timeout
    Timeout,

    /// A failure that may clear on retry (rate limit, overload, network)
    Transient(String),

    /// A failure that will not clear on retry (bad request, auth, policy)
    Permanent(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Timeout => f.write_str("timed out"),
            GenerationError::Transient(msg) => write!(f, "transient: {}", msg),
            GenerationError::Permanent(msg) => write!(f, "permanent: {}", msg),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Trait for AI text generation
///
/// Implemented by the infrastructure layer (waybill-llm). Generation is the
/// only pipeline step that suspends, so it is the only async capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt within `timeout`
    async fn generate(&self, prompt: &Prompt, timeout: Duration)
        -> Result<String, GenerationError>;

    /// Model name, for logs and reports
    fn model_name(&self) -> &str {
        "llm"
    }
}

/// One exported data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Source document identity
    pub identity: String,

    /// Record status (Valid or Partial)
    pub status: RecordStatus,

    /// Cell values in canonical schema order
    pub values: [String; SchemaField::COUNT],
}

/// One entry of the diagnostics section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    /// Source document identity
    pub identity: String,

    /// Why the document produced no row
    pub reason: String,
}

/// Trait for serializing rows into a spreadsheet-compatible file
///
/// Implemented by the infrastructure layer (waybill-export)
pub trait TableWriter {
    /// Error type for writing
    type Error: fmt::Display;

    /// Write the data rows and the diagnostics section, returning file bytes
    fn write_table(
        &self,
        rows: &[TableRow],
        diagnostics: &[DiagnosticEntry],
    ) -> Result<Vec<u8>, Self::Error>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(
        &self,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        (**self).generate(prompt, timeout).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
