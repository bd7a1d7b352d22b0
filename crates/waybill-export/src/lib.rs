//! Waybill Export
//!
//! Serializes a [`BatchResult`](waybill_domain::BatchResult) to a spreadsheet.
//! Valid and Partial records become data rows in input order; every other
//! document gets a diagnostics entry saying why it produced no row.
//!
//! ```no_run
//! use waybill_export::{export_filename, TableExporter, XlsxTableWriter};
//! # fn example(batch: &waybill_domain::BatchResult) -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = TableExporter::new(XlsxTableWriter::new()).export(batch)?;
//! let name = export_filename(&chrono::Local::now().naive_local());
//! std::fs::write(name, bytes)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod exporter;
mod xlsx;

pub use error::ExportError;
pub use exporter::{build_table, diagnostic_reason, export_filename, Table, TableExporter};
pub use xlsx::{data_headers, XlsxTableWriter, DATA_SHEET, DIAGNOSTICS_SHEET};
