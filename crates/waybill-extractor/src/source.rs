//! Document text acquisition

use tracing::{debug, warn};
use waybill_domain::traits::TextExtractor;
use waybill_domain::{ExtractedText, ExtractionError, SourceDocument};

/// Wraps a decoder and normalizes its failures
///
/// Empty payloads fail fast without reaching the decoder. Decoder errors are
/// final for the document; there is no retry at this stage.
pub struct DocumentTextSource<E> {
    extractor: E,
    max_text_length: usize,
}

impl<E: TextExtractor> DocumentTextSource<E> {
    /// Create a text source with a character limit
    pub fn new(extractor: E, max_text_length: usize) -> Self {
        Self {
            extractor,
            max_text_length,
        }
    }

    /// Extract text from one document
    ///
    /// Blank text is returned as-is; it is the parser's job to notice that
    /// nothing useful came back.
    pub fn extract(&self, document: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
        if document.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let mut text = self
            .extractor
            .extract_text(document.bytes())
            .map_err(|e| ExtractionError::DecodeFailed(e.to_string()))?;

        let chars = text.chars().count();
        if chars > self.max_text_length {
            warn!(
                "Truncating text of '{}' from {} to {} characters",
                document.identity(),
                chars,
                self.max_text_length
            );
            truncate_chars(&mut text, self.max_text_length);
        }

        debug!(
            "Extracted {} characters from '{}'",
            text.len(),
            document.identity()
        );
        Ok(ExtractedText::new(text))
    }
}

fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingExtractor {
        calls: Cell<usize>,
        result: Result<String, String>,
    }

    impl CountingExtractor {
        fn new(result: Result<&str, &str>) -> Self {
            Self {
                calls: Cell::new(0),
                result: result.map(str::to_string).map_err(str::to_string),
            }
        }
    }

    impl TextExtractor for CountingExtractor {
        type Error = String;

        fn extract_text(&self, _bytes: &[u8]) -> Result<String, Self::Error> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    #[test]
    fn test_empty_input_skips_decoder() {
        let source = DocumentTextSource::new(CountingExtractor::new(Ok("text")), 100);
        let result = source.extract(&SourceDocument::new("empty.pdf", Vec::new()));

        assert_eq!(result, Err(ExtractionError::EmptyInput));
        assert_eq!(source.extractor.calls.get(), 0);
    }

    #[test]
    fn test_decoder_failure_is_normalized() {
        let source = DocumentTextSource::new(CountingExtractor::new(Err("bad xref")), 100);
        let result = source.extract(&SourceDocument::new("a.pdf", vec![1, 2, 3]));

        assert_eq!(
            result,
            Err(ExtractionError::DecodeFailed("bad xref".to_string()))
        );
        assert_eq!(source.extractor.calls.get(), 1);
    }

    #[test]
    fn test_blank_text_is_not_an_error() {
        let source = DocumentTextSource::new(CountingExtractor::new(Ok("")), 100);
        let text = source
            .extract(&SourceDocument::new("scan.pdf", vec![1]))
            .unwrap();
        assert!(text.is_blank());
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let source = DocumentTextSource::new(CountingExtractor::new(Ok("ééééé")), 3);
        let text = source.extract(&SourceDocument::new("a.txt", vec![1])).unwrap();
        assert_eq!(text.as_str(), "ééé");
    }
}
