//! Excel workbook writer

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use waybill_domain::traits::{DiagnosticEntry, TableRow, TableWriter};
use waybill_domain::SchemaField;

/// Name of the data sheet
pub const DATA_SHEET: &str = "Shipping Data";

/// Name of the diagnostics sheet
pub const DIAGNOSTICS_SHEET: &str = "Diagnostics";

const MAX_COLUMN_WIDTH: usize = 255;

/// Writes rows to an `.xlsx` workbook with a data sheet and a diagnostics sheet
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTableWriter;

impl XlsxTableWriter {
    /// Create a writer
    pub fn new() -> Self {
        Self
    }
}

/// Header of the data sheet: schema labels, then file name and status
pub fn data_headers() -> Vec<&'static str> {
    SchemaField::ALL
        .iter()
        .map(|f| f.label())
        .chain(["File Name", "Status"])
        .collect()
}

impl TableWriter for XlsxTableWriter {
    type Error = XlsxError;

    fn write_table(
        &self,
        rows: &[TableRow],
        diagnostics: &[DiagnosticEntry],
    ) -> Result<Vec<u8>, Self::Error> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let data: Vec<Vec<&str>> = rows
            .iter()
            .map(|row| {
                row.values
                    .iter()
                    .map(String::as_str)
                    .chain([row.identity.as_str(), row.status.as_str()])
                    .collect()
            })
            .collect();
        let sheet = workbook.add_worksheet().set_name(DATA_SHEET)?;
        write_sheet(sheet, &header, &data_headers(), &data)?;

        let data: Vec<Vec<&str>> = diagnostics
            .iter()
            .map(|d| vec![d.identity.as_str(), d.reason.as_str()])
            .collect();
        let sheet = workbook.add_worksheet().set_name(DIAGNOSTICS_SHEET)?;
        write_sheet(sheet, &header, &["File Name", "Reason"], &data)?;

        workbook.save_to_buffer()
    }
}

fn write_sheet(
    sheet: &mut Worksheet,
    header: &Format,
    headers: &[&str],
    rows: &[Vec<&str>],
) -> Result<(), XlsxError> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for (col, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, column(col), *title, header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let line = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in row.iter().enumerate() {
            sheet.write_string(line, column(col), *value)?;
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    for (col, width) in widths.into_iter().enumerate() {
        let width = (width + 2).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(column(col), width as f64)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

// Column counts are fixed and small
fn column(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_domain::RecordStatus;

    #[test]
    fn test_data_headers() {
        assert_eq!(
            data_headers(),
            vec![
                "Order ID",
                "Recipient Name",
                "Recipient Address",
                "Courier Name",
                "Tracking Number",
                "File Name",
                "Status",
            ]
        );
    }

    #[test]
    fn test_writes_zip_container() {
        let rows = vec![TableRow {
            identity: "a.pdf".to_string(),
            status: RecordStatus::Valid,
            values: ["A1", "Jo", "1 Road", "DHL", "T1"].map(String::from),
        }];
        let diagnostics = vec![DiagnosticEntry {
            identity: "b.pdf".to_string(),
            reason: "cancelled".to_string(),
        }];

        let bytes = XlsxTableWriter::new().write_table(&rows, &diagnostics).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_table_still_writes() {
        let bytes = XlsxTableWriter::new().write_table(&[], &[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
