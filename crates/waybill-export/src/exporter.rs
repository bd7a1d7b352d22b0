//! Batch result to table conversion

use crate::error::ExportError;
use chrono::NaiveDateTime;
use tracing::info;
use waybill_domain::traits::{DiagnosticEntry, TableRow, TableWriter};
use waybill_domain::{
    BatchResult, DocumentOutcome, DocumentResult, FieldStatus, SchemaField, ValidatedRecord,
    NOT_FOUND,
};

/// Rows and diagnostics built from a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// One row per Valid or Partial record, in input order
    pub rows: Vec<TableRow>,

    /// One entry per document that produced no row, in input order
    pub diagnostics: Vec<DiagnosticEntry>,
}

/// Serializes a batch result through a [`TableWriter`]
pub struct TableExporter<W> {
    writer: W,
}

impl<W: TableWriter> TableExporter<W> {
    /// Create an exporter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Build the table and hand it to the writer
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Writer` if the writer fails. A batch without a
    /// single exportable record is not an error.
    pub fn export(&self, batch: &BatchResult) -> Result<Vec<u8>, ExportError> {
        let table = build_table(batch);
        info!(
            "Exporting batch {}: {} row(s), {} diagnostic(s)",
            batch.id(),
            table.rows.len(),
            table.diagnostics.len()
        );
        self.writer
            .write_table(&table.rows, &table.diagnostics)
            .map_err(|e| ExportError::Writer(e.to_string()))
    }
}

/// Split a batch into data rows and diagnostics
///
/// Every document lands in exactly one of the two.
pub fn build_table(batch: &BatchResult) -> Table {
    let mut table = Table::default();
    for result in batch.results() {
        match &result.outcome {
            DocumentOutcome::Record(record) if record.status().is_exportable() => {
                table.rows.push(row(result, record));
            }
            _ => table.diagnostics.push(diagnostic(result)),
        }
    }
    table
}

fn row(result: &DocumentResult, record: &ValidatedRecord) -> TableRow {
    let values = SchemaField::ALL.map(|field| match record.check(field).status {
        FieldStatus::Missing => NOT_FOUND.to_string(),
        // Invalid values are exported as-is for review
        FieldStatus::Valid | FieldStatus::Invalid(_) => record
            .value(field)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string()),
    });
    TableRow {
        identity: result.identity.clone(),
        status: record.status(),
        values,
    }
}

/// Why a document produced no row
pub fn diagnostic_reason(outcome: &DocumentOutcome) -> String {
    match outcome {
        DocumentOutcome::Record(record) => {
            let problems = record.problem_summary();
            if problems.is_empty() {
                record.status().as_str().to_lowercase()
            } else {
                format!("rejected: {}", problems)
            }
        }
        DocumentOutcome::Failed(failure) => failure.to_string(),
        DocumentOutcome::Cancelled => "cancelled".to_string(),
    }
}

fn diagnostic(result: &DocumentResult) -> DiagnosticEntry {
    DiagnosticEntry {
        identity: result.identity.clone(),
        reason: diagnostic_reason(&result.outcome),
    }
}

/// Timestamped export file name: `shipping_data_YYYYMMDD_HHMMSS.xlsx`
pub fn export_filename(now: &NaiveDateTime) -> String {
    format!("shipping_data_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}
