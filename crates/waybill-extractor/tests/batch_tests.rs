//! Integration tests for batch behavior: ordering, retries, cancellation

use std::time::Duration;
use waybill_domain::traits::GenerationError;
use waybill_domain::{
    DocumentOutcome, ExtractedText, OracleError, ParseError, ProcessingFailure, SourceDocument,
};
use waybill_extractor::{
    BatchOrchestrator, CancellationHandle, ExtractorConfig, OracleClient, PlainTextExtractor,
    PromptBuilder, ResponseParser, RetryPolicy,
};
use waybill_llm::MockProvider;

/// Fast retries, so tests do not sleep for real backoff
fn create_test_config(max_concurrency: usize) -> ExtractorConfig {
    ExtractorConfig {
        max_attempts: 3,
        base_backoff_ms: 1,
        max_backoff_ms: 4,
        max_concurrency,
        ..Default::default()
    }
}

fn documents(n: usize) -> Vec<SourceDocument> {
    (0..n)
        .map(|i| {
            SourceDocument::new(
                format!("waybill_{:02}.txt", i),
                format!("consignment #{:02}", i).into_bytes(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_results_match_input_order_despite_timing() {
    let provider = MockProvider::new("Order ID: ok");
    // Earlier documents answer later than later ones
    for i in 0..8u64 {
        provider.add_delay(
            format!("consignment #{:02}", i),
            Duration::from_millis((8 - i) * 15),
        );
    }

    let orchestrator =
        BatchOrchestrator::new(PlainTextExtractor, provider, &create_test_config(8)).unwrap();
    let result = orchestrator
        .run(documents(8), &CancellationHandle::new())
        .await;

    assert_eq!(result.len(), 8);
    for (i, doc) in result.results().iter().enumerate() {
        assert_eq!(doc.index, i);
        assert_eq!(doc.identity, format!("waybill_{:02}.txt", i));
    }
}

#[tokio::test]
async fn test_cancel_after_second_document() {
    let provider = MockProvider::new("Order ID: ok");
    let cancel = CancellationHandle::new();
    let trigger = cancel.clone();

    let orchestrator =
        BatchOrchestrator::new(PlainTextExtractor, provider.clone(), &create_test_config(1))
            .unwrap()
            .with_progress(move |progress| {
                if progress.completed == 2 {
                    trigger.cancel();
                }
            });

    let result = orchestrator.run(documents(5), &cancel).await;
    let results = result.results();

    assert_eq!(results.len(), 5);
    assert!(results[0].record().is_some());
    assert!(results[1].record().is_some());
    for doc in &results[2..] {
        assert_eq!(doc.outcome, DocumentOutcome::Cancelled);
        assert!(doc.failure().is_none());
    }
    assert_eq!(result.summary().cancelled, 3);
    assert_eq!(result.summary().failed, 0);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let provider = MockProvider::new("unused");
    provider.push_outcome(Err(GenerationError::Transient("HTTP 503".into())));
    provider.push_outcome(Err(GenerationError::Transient("HTTP 503".into())));
    provider.push_outcome(Ok("Order ID: third-attempt".into()));

    let client = OracleClient::new(
        provider.clone(),
        RetryPolicy::from_config(&create_test_config(1)),
    );
    let prompt = PromptBuilder::new().build(&ExtractedText::new("bill"));

    assert_eq!(client.call(&prompt).await.unwrap(), "Order ID: third-attempt");
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_marks_document_failed() {
    let provider = MockProvider::new("unused");
    for _ in 0..3 {
        provider.push_outcome(Err(GenerationError::Transient("HTTP 529".into())));
    }

    let orchestrator =
        BatchOrchestrator::new(PlainTextExtractor, provider.clone(), &create_test_config(1))
            .unwrap();
    let result = orchestrator
        .run(documents(1), &CancellationHandle::new())
        .await;

    match result.results()[0].failure() {
        Some(ProcessingFailure::Oracle(OracleError::Unavailable { attempts, .. })) => {
            assert_eq!(*attempts, 3);
        }
        other => panic!("Expected Unavailable, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 3);
}

#[test]
fn test_unlabeled_response_is_malformed() {
    let parser = ResponseParser::default();
    let result = parser.parse("The document appears to be an invoice for office chairs.");
    assert!(matches!(result, Err(ParseError::Malformed(_))));
}

#[test]
fn test_prompt_determinism() {
    let text = ExtractedText::new("--- Page 1 ---\nShip to: R. Singh\nAWB 7781 2231");
    let first = PromptBuilder::new().build(&text);
    let second = PromptBuilder::new().build(&text);
    assert_eq!(first.system.as_bytes(), second.system.as_bytes());
    assert_eq!(first.user.as_bytes(), second.user.as_bytes());
}

#[tokio::test]
async fn test_one_result_per_document() {
    for n in [1usize, 2, 7] {
        let orchestrator = BatchOrchestrator::new(
            PlainTextExtractor,
            MockProvider::new("Courier Name: DHL"),
            &create_test_config(3),
        )
        .unwrap();
        let result = orchestrator
            .run(documents(n), &CancellationHandle::new())
            .await;
        assert_eq!(result.len(), n);
        assert_eq!(result.summary().total, n);
    }
}
