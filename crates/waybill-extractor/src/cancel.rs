//! Cooperative batch cancellation

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation signal for a batch run
///
/// Cancelling stops new documents from being scheduled. Documents already
/// in flight get the configured grace period to finish.
///
/// # Examples
///
/// ```
/// use waybill_extractor::CancellationHandle;
///
/// # tokio_test::block_on(async {
/// let handle = CancellationHandle::new();
/// let trigger = handle.clone();
/// trigger.cancel();
///
/// handle.cancelled().await;
/// assert!(handle.is_cancelled());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationHandle {
    /// Create an untriggered handle
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once set
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}
