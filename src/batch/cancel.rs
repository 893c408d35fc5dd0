use std::sync::Arc;

use tokio::sync::watch;

/// Clonable handle for requesting best-effort cancellation of a batch.
///
/// Tripping the flag unblocks the collector promptly and stops executors from
/// claiming further tasks. It never interrupts a worker-function invocation
/// that has already started; that invocation runs to completion and its
/// outcome is discarded.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Create a fresh, untripped flag.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        // Send only fails when every receiver is gone, in which case there is
        // nobody left to observe the flag anyway.
        let _ = self.tx.send(true);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A receiver that wakes when the flag trips.
    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
