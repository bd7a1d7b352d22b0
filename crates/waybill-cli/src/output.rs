//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use waybill_domain::{BatchResult, DocumentOutcome, DocumentResult, SchemaField};
use waybill_export::diagnostic_reason;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the per-document results of a batch.
    pub fn format_batch(&self, batch: &BatchResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_batch_json(batch),
            OutputFormat::Table => Ok(self.format_batch_table(batch)),
            OutputFormat::Quiet => Ok(self.format_batch_quiet(batch)),
        }
    }

    fn format_batch_json(&self, batch: &BatchResult) -> Result<String> {
        let documents: Vec<serde_json::Value> = batch.results().iter().map(document_json).collect();
        let summary = batch.summary();
        let json = serde_json::json!({
            "batch_id": batch.id().to_string(),
            "elapsed_ms": batch.elapsed_ms(),
            "summary": {
                "total": summary.total,
                "succeeded": summary.succeeded,
                "partial": summary.partial,
                "rejected": summary.rejected,
                "failed": summary.failed,
                "cancelled": summary.cancelled,
            },
            "documents": documents,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_batch_table(&self, batch: &BatchResult) -> String {
        if batch.is_empty() {
            return self.colorize("No documents processed.", "yellow");
        }

        let mut builder = Builder::default();
        let mut header = vec!["#", "File", "Status"];
        header.extend(SchemaField::ALL.iter().map(|f| f.label()));
        header.push("Notes");
        builder.push_record(header);

        for result in batch.results() {
            let mut record = vec![
                (result.index + 1).to_string(),
                result.identity.clone(),
                self.status(result),
            ];
            match &result.outcome {
                DocumentOutcome::Record(validated) => {
                    record.extend(SchemaField::ALL.iter().map(|f| {
                        validated.value(*f).unwrap_or("-").to_string()
                    }));
                    record.push(validated.problem_summary());
                }
                outcome => {
                    record.extend(SchemaField::ALL.iter().map(|_| "-".to_string()));
                    record.push(diagnostic_reason(outcome));
                }
            }
            builder.push_record(record);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", table, batch.summary().summary())
    }

    fn format_batch_quiet(&self, batch: &BatchResult) -> String {
        batch
            .results()
            .iter()
            .map(|r| format!("{}\t{}", r.identity, r.status_label()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn status(&self, result: &DocumentResult) -> String {
        let label = result.status_label();
        let color = match label {
            "Valid" => "green",
            "Partial" => "yellow",
            "Cancelled" => "magenta",
            _ => "red",
        };
        self.colorize(label, color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn document_json(result: &DocumentResult) -> serde_json::Value {
    let fields: serde_json::Value = match &result.outcome {
        DocumentOutcome::Record(record) => SchemaField::ALL
            .iter()
            .map(|f| {
                (
                    f.label().to_string(),
                    serde_json::json!({
                        "value": record.value(*f),
                        "valid": record.check(*f).status.is_valid(),
                    }),
                )
            })
            .collect::<serde_json::Map<_, _>>()
            .into(),
        _ => serde_json::Value::Null,
    };
    let reason = match &result.outcome {
        DocumentOutcome::Record(record) if record.status().is_exportable() => None,
        outcome => Some(diagnostic_reason(outcome)),
    };
    serde_json::json!({
        "index": result.index,
        "file": result.identity,
        "status": result.status_label(),
        "fields": fields,
        "reason": reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_domain::{
        BatchId, CandidateRecord, FieldCheck, FieldStatus, OracleError, ValidatedRecord,
    };

    fn create_test_batch() -> BatchResult {
        let candidate = CandidateRecord::new()
            .with(SchemaField::OrderId, "SO-1")
            .with(SchemaField::CourierName, "DHL");
        let checks = SchemaField::ALL.map(|f| {
            if candidate.is_present(f) {
                FieldCheck::new(f, FieldStatus::Valid)
            } else {
                FieldCheck::new(f, FieldStatus::Missing)
            }
        });
        let results = vec![
            DocumentResult::new(
                0,
                "a.pdf",
                DocumentOutcome::Record(ValidatedRecord::new(candidate, checks)),
            ),
            DocumentResult::new(
                1,
                "b.pdf",
                DocumentOutcome::Failed(OracleError::Timeout.into()),
            ),
            DocumentResult::new(2, "c.pdf", DocumentOutcome::Cancelled),
        ];
        BatchResult::new(BatchId::new(), results, 42)
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_batch(&create_test_batch()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["documents"][0]["status"], "Partial");
        assert_eq!(json["documents"][0]["fields"]["Order ID"]["value"], "SO-1");
        assert_eq!(json["documents"][0]["reason"], serde_json::Value::Null);
        assert_eq!(json["documents"][1]["reason"], "oracle: Oracle call timed out");
        assert_eq!(json["documents"][2]["status"], "Cancelled");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_batch(&create_test_batch()).unwrap();
        assert_eq!(output, "a.pdf\tPartial\nb.pdf\tFailed\nc.pdf\tCancelled");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_batch(&create_test_batch()).unwrap();
        assert!(output.contains("Tracking Number"));
        assert!(output.contains("SO-1"));
        assert!(output.contains("cancelled"));
    }

    #[test]
    fn test_empty_batch() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let batch = BatchResult::new(BatchId::new(), Vec::new(), 0);
        let output = formatter.format_batch(&batch).unwrap();
        assert!(output.contains("No documents processed"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
