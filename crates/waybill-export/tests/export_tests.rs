//! End-to-end export of a mixed batch to an xlsx workbook

use waybill_domain::{
    BatchId, BatchResult, CandidateRecord, DocumentOutcome, DocumentResult, ParseError,
    SchemaField,
};
use waybill_export::{build_table, ExportError, TableExporter, XlsxTableWriter};
use waybill_gatekeeper::RecordValidator;

fn validated(candidate: CandidateRecord) -> DocumentOutcome {
    DocumentOutcome::Record(RecordValidator::default_config().validate(&candidate))
}

fn mixed_batch() -> BatchResult {
    let full = CandidateRecord::new()
        .with(SchemaField::OrderId, "SO1001")
        .with(SchemaField::RecipientName, "Asha Rao")
        .with(SchemaField::RecipientAddress, "12 MG Road, Pune")
        .with(SchemaField::CourierName, "Delhivery")
        .with(SchemaField::TrackingNumber, "DL123456789IN");
    let partial = CandidateRecord::new()
        .with(SchemaField::OrderId, "SO1002")
        .with(SchemaField::CourierName, "DHL");

    let outcomes = vec![
        validated(full),
        validated(partial),
        validated(CandidateRecord::new()),
        DocumentOutcome::Failed(ParseError::Malformed("no labels".into()).into()),
    ];
    let results = outcomes
        .into_iter()
        .enumerate()
        .map(|(i, o)| DocumentResult::new(i, format!("bill_{}.pdf", i), o))
        .collect();
    BatchResult::new(BatchId::new(), results, 12)
}

#[test]
fn test_mixed_batch_exports_rows_and_diagnostics() -> Result<(), ExportError> {
    let batch = mixed_batch();
    let table = build_table(&batch);

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].values[1], "Not Found");
    assert_eq!(table.diagnostics.len(), 2);
    assert_eq!(table.diagnostics[1].reason, "parse: Malformed oracle response: no labels");

    let bytes = TableExporter::new(XlsxTableWriter::new()).export(&batch)?;
    assert!(bytes.starts_with(b"PK"));
    Ok(())
}
