//! Waybill Domain Layer
//!
//! Core data model for turning courier airway-bill documents into validated
//! shipping records. This crate has no infrastructure dependencies: it defines
//! the value types that flow through the pipeline, the error taxonomy, and the
//! capability traits that infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **SourceDocument**: an identity plus the raw bytes of one uploaded file
//! - **CandidateRecord**: untrusted field values parsed from oracle output
//! - **ValidatedRecord**: a candidate plus per-field verdicts and an overall status
//! - **DocumentResult / BatchResult**: exactly one outcome per input document,
//!   in input order
//!
//! ## Pipeline
//!
//! ```text
//! bytes → text → prompt → oracle → candidate → validated record
//! ```
//!
//! Every external collaborator (PDF decoding, the AI oracle, spreadsheet
//! writing) is reached through a trait in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod document;
pub mod error;
pub mod record;
pub mod result;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use batch::BatchId;
pub use document::{ExtractedText, Prompt, SourceDocument};
pub use error::{ExtractionError, OracleError, ParseError, ProcessingFailure};
pub use record::{
    CandidateRecord, FieldCheck, FieldFlag, FieldStatus, RecordStatus, ValidatedRecord,
};
pub use result::{BatchResult, BatchSummary, DocumentOutcome, DocumentResult, FailureStage};
pub use schema::{SchemaField, ValueShape, NOT_FOUND};
