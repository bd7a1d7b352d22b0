//! Batch orchestration
//!
//! Fans documents out to worker tasks with bounded concurrency and collects
//! their outcomes through a channel keyed by input index. Scheduling happens
//! in the collecting loop, so a cancellation observed there stops the next
//! document from starting.

use crate::cancel::CancellationHandle;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};
use waybill_domain::traits::{TextExtractor, TextGenerator};
use waybill_domain::{BatchId, BatchResult, DocumentOutcome, DocumentResult, SourceDocument};

/// Progress of a running batch, reported after each document completes
#[derive(Debug)]
pub struct Progress<'a> {
    /// Documents completed so far
    pub completed: usize,

    /// Documents in the batch
    pub total: usize,

    /// Identity of the document that just completed
    pub identity: &'a str,

    /// Its outcome
    pub outcome: &'a DocumentOutcome,
}

/// Progress callback
pub type ProgressFn = Arc<dyn Fn(&Progress<'_>) + Send + Sync>;

type Completion = (usize, Option<DocumentOutcome>);

/// Runs the pipeline over a batch of documents
pub struct BatchOrchestrator<E, G> {
    pipeline: Arc<Pipeline<E, G>>,
    max_concurrency: usize,
    batch_deadline: Option<Duration>,
    cancel_grace: Duration,
    progress: Option<ProgressFn>,
}

impl<E, G> BatchOrchestrator<E, G>
where
    E: TextExtractor + Send + Sync + 'static,
    G: TextGenerator + 'static,
{
    /// Create an orchestrator after validating the configuration
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` for invalid configuration values.
    pub fn new(extractor: E, generator: G, config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        Ok(Self {
            pipeline: Arc::new(Pipeline::new(extractor, generator, config)),
            max_concurrency: config.max_concurrency,
            batch_deadline: config.batch_deadline(),
            cancel_grace: config.cancel_grace(),
            progress: None,
        })
    }

    /// Report progress through a callback
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&Progress<'_>) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Model name of the oracle
    pub fn model_name(&self) -> &str {
        self.pipeline.model_name()
    }

    /// Run the batch to completion, cancellation, or the batch deadline
    ///
    /// The result holds exactly one outcome per input document, in input
    /// order. Documents that never started or were abandoned after the
    /// grace period or deadline are `Cancelled`.
    pub async fn run(
        &self,
        documents: Vec<SourceDocument>,
        cancel: &CancellationHandle,
    ) -> BatchResult {
        let id = BatchId::new();
        let started = Instant::now();
        let total = documents.len();
        // A deadline past the clock's range never fires
        let deadline_at = self.batch_deadline.and_then(|d| started.checked_add(d));

        info!(
            "Starting batch {} with {} document(s), concurrency {}",
            id, total, self.max_concurrency
        );

        let identities: Vec<String> = documents
            .iter()
            .map(|d| d.identity().to_string())
            .collect();
        let mut outcomes: Vec<Option<DocumentOutcome>> = (0..total).map(|_| None).collect();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        let mut queue = documents.into_iter().enumerate();
        let mut next = queue.next();
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(total);
        let mut in_flight = 0usize;
        let mut completed = 0usize;
        let mut stopping = false;
        let mut grace_until: Option<Instant> = None;

        loop {
            if !stopping && !cancel.is_cancelled() {
                while let Some((index, document)) = next.take() {
                    let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                        next = Some((index, document));
                        break;
                    };
                    handles.push(self.spawn_worker(index, document, permit, tx.clone()));
                    in_flight += 1;
                    next = queue.next();
                }
            }

            if in_flight == 0 && (next.is_none() || stopping || cancel.is_cancelled()) {
                break;
            }

            tokio::select! {
                Some((index, outcome)) = rx.recv() => {
                    in_flight -= 1;
                    if let Some(outcome) = outcome {
                        completed += 1;
                        if let Some(progress) = &self.progress {
                            progress(&Progress {
                                completed,
                                total,
                                identity: &identities[index],
                                outcome: &outcome,
                            });
                        }
                        outcomes[index] = Some(outcome);
                    } else {
                        warn!("Document '{}' ended without an outcome", identities[index]);
                    }
                }
                _ = cancel.cancelled(), if !stopping => {
                    info!(
                        "Batch {} cancelled; {} in-flight document(s) get {:?} to finish",
                        id, in_flight, self.cancel_grace
                    );
                    stopping = true;
                    grace_until = Instant::now().checked_add(self.cancel_grace);
                }
                _ = sleep_until_opt(grace_until), if grace_until.is_some() => {
                    warn!(
                        "Batch {} grace period over; abandoning {} document(s)",
                        id, in_flight
                    );
                    break;
                }
                _ = sleep_until_opt(deadline_at), if deadline_at.is_some() => {
                    warn!(
                        "Batch {} deadline reached; abandoning {} in-flight document(s)",
                        id, in_flight
                    );
                    break;
                }
            }
        }

        for handle in &handles {
            handle.abort();
        }

        let results: Vec<DocumentResult> = identities
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (identity, outcome))| {
                DocumentResult::new(index, identity, outcome.unwrap_or(DocumentOutcome::Cancelled))
            })
            .collect();

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let result = BatchResult::new(id, results, elapsed_ms);
        info!("Batch {} finished in {}ms: {}", id, elapsed_ms, result.summary().summary());
        result
    }

    fn spawn_worker(
        &self,
        index: usize,
        document: SourceDocument,
        permit: OwnedSemaphorePermit,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let slot = Slot {
            index,
            tx,
            outcome: None,
            permit: Some(permit),
        };
        tokio::spawn(async move {
            slot.finish(pipeline.process(&document).await);
        })
    }
}

/// Reports a worker's completion when dropped, including on abort or panic
struct Slot {
    index: usize,
    tx: mpsc::UnboundedSender<Completion>,
    outcome: Option<DocumentOutcome>,
    permit: Option<OwnedSemaphorePermit>,
}

impl Slot {
    fn finish(mut self, outcome: DocumentOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        // Free the permit before reporting so the collector can schedule at once
        drop(self.permit.take());
        let _ = self.tx.send((self.index, self.outcome.take()));
    }
}

async fn sleep_until_opt(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
