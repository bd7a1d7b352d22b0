//! Per-document outcomes and the aggregated batch result

use crate::batch::BatchId;
use crate::error::ProcessingFailure;
use crate::record::{RecordStatus, ValidatedRecord};

/// Pipeline stage that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Text extraction
    Extraction,

    /// Oracle call
    Oracle,

    /// Response parsing
    Parse,
}

impl FailureStage {
    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Extraction => "extraction",
            FailureStage::Oracle => "oracle",
            FailureStage::Parse => "parse",
        }
    }
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The pipeline ran to completion
    Record(ValidatedRecord),

    /// The pipeline stopped at a failing stage
    Failed(ProcessingFailure),

    /// The document was not completed before cancellation or the batch deadline
    Cancelled,
}

/// Outcome for one input document, tagged with its identity and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResult {
    /// Position in the input
    pub index: usize,

    /// Document identity
    pub identity: String,

    /// Outcome
    pub outcome: DocumentOutcome,
}

impl DocumentResult {
    /// Create a result
    pub fn new(index: usize, identity: impl Into<String>, outcome: DocumentOutcome) -> Self {
        Self {
            index,
            identity: identity.into(),
            outcome,
        }
    }

    /// The validated record, if the pipeline completed
    pub fn record(&self) -> Option<&ValidatedRecord> {
        match &self.outcome {
            DocumentOutcome::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The failure, if the pipeline stopped early
    pub fn failure(&self) -> Option<&ProcessingFailure> {
        match &self.outcome {
            DocumentOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the document was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, DocumentOutcome::Cancelled)
    }

    /// Short status label: Valid, Partial, Rejected, Failed or Cancelled
    pub fn status_label(&self) -> &'static str {
        match &self.outcome {
            DocumentOutcome::Record(record) => record.status().as_str(),
            DocumentOutcome::Failed(_) => "Failed",
            DocumentOutcome::Cancelled => "Cancelled",
        }
    }
}

/// Counts of each outcome in a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents in the batch
    pub total: usize,

    /// Valid records
    pub succeeded: usize,

    /// Partial records
    pub partial: usize,

    /// Rejected records
    pub rejected: usize,

    /// Processing failures
    pub failed: usize,

    /// Cancelled documents
    pub cancelled: usize,
}

impl BatchSummary {
    /// Count outcomes in a single pass
    pub fn from_results(results: &[DocumentResult]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match &result.outcome {
                DocumentOutcome::Record(record) => match record.status() {
                    RecordStatus::Valid => summary.succeeded += 1,
                    RecordStatus::Partial => summary.partial += 1,
                    RecordStatus::Rejected => summary.rejected += 1,
                },
                DocumentOutcome::Failed(_) => summary.failed += 1,
                DocumentOutcome::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }

    /// Number of rows an export will contain
    pub fn exportable(&self) -> usize {
        self.succeeded + self.partial
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} document(s): {} valid, {} partial, {} rejected, {} failed, {} cancelled",
            self.total, self.succeeded, self.partial, self.rejected, self.failed, self.cancelled
        )
    }
}

/// The result of one batch run
///
/// Holds exactly one [`DocumentResult`] per input document, in input order.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    id: BatchId,
    results: Vec<DocumentResult>,
    summary: BatchSummary,
    elapsed_ms: u64,
}

impl BatchResult {
    /// Assemble a batch result; results are sorted by input index
    pub fn new(id: BatchId, mut results: Vec<DocumentResult>, elapsed_ms: u64) -> Self {
        results.sort_by_key(|r| r.index);
        let summary = BatchSummary::from_results(&results);
        Self {
            id,
            results,
            summary,
            elapsed_ms,
        }
    }

    /// Batch identifier
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Per-document results in input order
    pub fn results(&self) -> &[DocumentResult] {
        &self.results
    }

    /// Outcome counts
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    /// Wall-clock duration of the run
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the batch had no documents
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
