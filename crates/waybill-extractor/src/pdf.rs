//! Document decoders
//!
//! `PdfTextExtractor` decodes the embedded text layer of digital PDFs with
//! the `pdf-extract` crate. Scanned PDFs without a text layer decode to
//! blank text, which is a valid (if unhelpful) result.

use thiserror::Error;
use tracing::debug;
use waybill_domain::traits::TextExtractor;

/// Magic bytes at the start of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Decoder failures; only the message survives into the batch result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The PDF library reported an error
    #[error("PDF parsing failed: {0}")]
    Pdf(String),

    /// The PDF library panicked on malformed input
    #[error("PDF parsing aborted on malformed input")]
    Aborted,
}

/// PDF text extractor using the pdf-extract crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Decode each page separately
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
        // pdf-extract can panic on broken cross-reference tables
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| DecodeError::Aborted)?
            .map_err(|e| DecodeError::Pdf(e.to_string()))
    }
}

impl TextExtractor for PdfTextExtractor {
    type Error = DecodeError;

    fn extract_text(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        let pages = self.extract_pages(bytes)?;
        debug!("Decoded {} PDF page(s)", pages.len());
        Ok(preprocess(&join_pages(&pages)))
    }
}

/// Treats the payload as UTF-8 text (lossy)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    type Error = DecodeError;

    fn extract_text(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        Ok(preprocess(&String::from_utf8_lossy(bytes)))
    }
}

/// Picks the PDF decoder for `%PDF-` payloads and plain text otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectingExtractor;

impl TextExtractor for DetectingExtractor {
    type Error = DecodeError;

    fn extract_text(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        if is_pdf(bytes) {
            PdfTextExtractor.extract_text(bytes)
        } else {
            PlainTextExtractor.extract_text(bytes)
        }
    }
}

/// Whether the payload looks like a PDF file
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Join pages with numbered separators so the oracle sees page boundaries
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("--- Page {} ---\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Normalize decoded text
///
/// Collapses whitespace runs inside each line, keeps at most one blank line
/// between paragraphs, and trims blank lines at both ends.
pub fn preprocess(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        let blank = collapsed.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        lines.push(collapsed);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
