//! Waybill Extractor
//!
//! Turns courier airway-bill documents into validated shipping records using
//! an LLM as an unreliable oracle.
//!
//! # Architecture
//!
//! ```text
//! bytes → DocumentTextSource → PromptBuilder → OracleClient → ResponseParser → RecordValidator
//! ```
//!
//! Each document runs through this [`Pipeline`] on its own. The
//! [`BatchOrchestrator`] fans documents out with bounded concurrency,
//! isolates failures per document and reassembles outcomes in input order.
//!
//! # Key Features
//!
//! - **Typed failures**: every document ends as a record, a failure with its
//!   stage, or `Cancelled`
//! - **Retry policy**: bounded exponential backoff for transient oracle failures
//! - **Tolerant parsing**: label synonyms, JSON or `Label: value` answers
//! - **Cancellation**: cooperative, with a grace period and a batch deadline
//!
//! # Example Usage
//!
//! ```no_run
//! use waybill_extractor::{BatchOrchestrator, CancellationHandle, ExtractorConfig, PdfTextExtractor};
//! use waybill_domain::SourceDocument;
//! use waybill_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("Order ID: A1\nCourier Name: DHL");
//! let config = ExtractorConfig::default();
//! let orchestrator = BatchOrchestrator::new(PdfTextExtractor, llm, &config)?;
//!
//! let documents = vec![SourceDocument::new("bill.pdf", std::fs::read("bill.pdf")?)];
//! let result = orchestrator.run(documents, &CancellationHandle::new()).await;
//!
//! println!("{}", result.summary().summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod source;
mod pdf;
mod prompt;
mod oracle;
mod labels;
mod parser;
mod pipeline;
mod cancel;
mod batch;


pub use error::ExtractorError;
pub use config::ExtractorConfig;
pub use source::DocumentTextSource;
pub use pdf::{
    is_pdf, join_pages, preprocess, DecodeError, DetectingExtractor, PdfTextExtractor,
    PlainTextExtractor,
};
pub use prompt::PromptBuilder;
pub use oracle::{OracleClient, RetryPolicy};
pub use labels::{label_key, LabelMatcher};
pub use parser::ResponseParser;
pub use pipeline::Pipeline;
pub use cancel::CancellationHandle;
pub use batch::{BatchOrchestrator, Progress, ProgressFn};
