//! Per-document extraction pipeline

use crate::config::ExtractorConfig;
use crate::labels::LabelMatcher;
use crate::oracle::{OracleClient, RetryPolicy};
use crate::parser::ResponseParser;
use crate::prompt::PromptBuilder;
use crate::source::DocumentTextSource;
use tracing::{debug, info_span, Instrument};
use waybill_domain::traits::{TextExtractor, TextGenerator};
use waybill_domain::{DocumentOutcome, ProcessingFailure, SourceDocument, ValidatedRecord};
use waybill_gatekeeper::RecordValidator;

/// Runs one document through extraction, prompting, the oracle, parsing and
/// validation
///
/// The first failing stage ends the document's run; the failure becomes the
/// document's outcome. Nothing here touches state shared with other
/// documents.
pub struct Pipeline<E, G> {
    source: DocumentTextSource<E>,
    prompts: PromptBuilder,
    oracle: OracleClient<G>,
    parser: ResponseParser,
    validator: RecordValidator,
}

impl<E, G> Pipeline<E, G>
where
    E: TextExtractor,
    G: TextGenerator,
{
    /// Create a pipeline from its collaborators and configuration
    pub fn new(extractor: E, generator: G, config: &ExtractorConfig) -> Self {
        let matcher = LabelMatcher::new().with_extra_labels(&config.extra_labels);
        Self {
            source: DocumentTextSource::new(extractor, config.max_text_length),
            prompts: PromptBuilder::new(),
            oracle: OracleClient::new(generator, RetryPolicy::from_config(config)),
            parser: ResponseParser::new(matcher),
            validator: RecordValidator::new(config.validation.clone()),
        }
    }

    /// Model name of the oracle
    pub fn model_name(&self) -> &str {
        self.oracle.model_name()
    }

    /// Process one document
    pub async fn process(&self, document: &SourceDocument) -> DocumentOutcome {
        let span = info_span!("document", identity = %document.identity());
        match self.run(document).instrument(span).await {
            Ok(record) => DocumentOutcome::Record(record),
            Err(failure) => {
                debug!(
                    "Document '{}' failed at {} stage: {}",
                    document.identity(),
                    failure.stage().as_str(),
                    failure
                );
                DocumentOutcome::Failed(failure)
            }
        }
    }

    async fn run(&self, document: &SourceDocument) -> Result<ValidatedRecord, ProcessingFailure> {
        let text = self.source.extract(document)?;

        let prompt = self.prompts.build(&text);
        debug!("Prompt length: {} chars", prompt.len());

        let response = self.oracle.call(&prompt).await?;
        debug!("Oracle response length: {} chars", response.len());

        let candidate = self.parser.parse(&response)?;
        let record = self.validator.validate(&candidate);

        debug!(
            "Document '{}': {} ({} field(s) present)",
            document.identity(),
            record.status().as_str(),
            candidate.present_count()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PlainTextExtractor;
    use waybill_domain::traits::GenerationError;
    use waybill_domain::{
        ExtractionError, FailureStage, OracleError, ParseError, RecordStatus, SchemaField,
    };
    use waybill_llm::MockProvider;

    const FULL_ANSWER: &str = "Order ID: 7781\n\
        Recipient Name: Maria Rossi\n\
        Recipient Address: Via Roma 1, Milano\n\
        Courier Name: DHL\n\
        Tracking Number: JD014600003SE";

    fn fast_config() -> ExtractorConfig {
        ExtractorConfig {
            base_backoff_ms: 1,
            max_backoff_ms: 2,
            ..Default::default()
        }
    }

    fn pipeline(provider: MockProvider) -> Pipeline<PlainTextExtractor, MockProvider> {
        Pipeline::new(PlainTextExtractor, provider, &fast_config())
    }

    fn doc(text: &str) -> SourceDocument {
        SourceDocument::new("bill.txt", text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_full_document_is_valid() {
        let outcome = pipeline(MockProvider::new(FULL_ANSWER))
            .process(&doc("AWB JD014600003SE ..."))
            .await;

        match outcome {
            DocumentOutcome::Record(record) => {
                assert_eq!(record.status(), RecordStatus::Valid);
                assert_eq!(record.value(SchemaField::CourierName), Some("DHL"));
            }
            other => panic!("Expected record, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_line_answer_is_valid() {
        let outcome = pipeline(MockProvider::new(
            "Order ID: 7781 | Weight: 2kg | Recipient Name: Maria Rossi; \
             Recipient Address: Via Roma 1, Milano | Courier Name: DHL | \
             Tracking Number: JD014600003SE",
        ))
        .process(&doc("bill"))
        .await;

        let record = match outcome {
            DocumentOutcome::Record(record) => record,
            other => panic!("Expected record, got {:?}", other),
        };
        assert_eq!(record.status(), RecordStatus::Valid);
        assert_eq!(record.value(SchemaField::OrderId), Some("7781"));
        assert_eq!(
            record.value(SchemaField::RecipientAddress),
            Some("Via Roma 1, Milano")
        );
    }

    #[tokio::test]
    async fn test_empty_document_never_reaches_oracle() {
        let provider = MockProvider::new(FULL_ANSWER);
        let outcome = pipeline(provider.clone()).process(&doc("")).await;

        assert_eq!(
            outcome,
            DocumentOutcome::Failed(ExtractionError::EmptyInput.into())
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_recorded() {
        let provider = MockProvider::new(FULL_ANSWER);
        provider.add_error("forbidden", GenerationError::Permanent("policy".into()));

        let outcome = pipeline(provider).process(&doc("forbidden content")).await;
        match outcome {
            DocumentOutcome::Failed(failure) => {
                assert_eq!(failure.stage(), FailureStage::Oracle);
                assert_eq!(
                    failure,
                    ProcessingFailure::Oracle(OracleError::Rejected("policy".into()))
                );
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unlabeled_answer_is_parse_failure() {
        let outcome = pipeline(MockProvider::new("I cannot help with that."))
            .process(&doc("some bill"))
            .await;

        match outcome {
            DocumentOutcome::Failed(ProcessingFailure::Parse(ParseError::Malformed(_))) => {}
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_answer() {
        let outcome = pipeline(MockProvider::new(
            "Order ID: 7781\nCourier Name: Not Found\nTracking Number: JD 0146",
        ))
        .process(&doc("bill"))
        .await;

        let record = match outcome {
            DocumentOutcome::Record(record) => record,
            other => panic!("Expected record, got {:?}", other),
        };
        assert_eq!(record.status(), RecordStatus::Partial);
        assert_eq!(record.valid_count(), 1);
        assert_eq!(record.invalid_fields().len(), 1);
    }

    #[tokio::test]
    async fn test_extra_labels_from_config() {
        let mut config = fast_config();
        config
            .extra_labels
            .insert("Tracking Number".into(), vec!["Docket".into()]);
        let pipeline = Pipeline::new(
            PlainTextExtractor,
            MockProvider::new("Docket: DK-1"),
            &config,
        );

        let outcome = pipeline.process(&doc("bill")).await;
        let record = match outcome {
            DocumentOutcome::Record(record) => record,
            other => panic!("Expected record, got {:?}", other),
        };
        assert_eq!(record.value(SchemaField::TrackingNumber), Some("DK-1"));
    }
}
