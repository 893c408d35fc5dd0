use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::batch::cancel::CancelHandle;
use crate::batch::collector::collect;
use crate::batch::pool::spawn_executors;
use crate::batch::queue::TaskQueue;
use crate::batch::types::{BatchSummary, WorkerCount};
use crate::Result;

/// Entry point for running one batch of tasks to completion or first failure.
///
/// The runner is configured builder-style and may be reused across batches;
/// each call to [`run`](BatchRunner::run) executes one independent batch.
/// Cancellation requested through [`cancel_handle`](BatchRunner::cancel_handle)
/// applies to whichever batch is in flight.
pub struct BatchRunner {
    workers: WorkerCount,
    cancel: CancelHandle,
}

impl BatchRunner {
    /// Create a runner with the default fixed worker count (one per CPU).
    pub fn new() -> Self {
        Self {
            workers: WorkerCount::default(),
            cancel: CancelHandle::new(),
        }
    }

    /// Set the worker count policy.
    pub fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Handle for requesting best-effort cancellation of the running batch.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run every task through `worker_fn` across the configured number of
    /// concurrent executors.
    ///
    /// Returns the success values in arrival order, or the first captured
    /// failure. On the failure path the call returns as soon as the failure
    /// is observed; executors still mid-task are abandoned and their pending
    /// outcomes discarded. On the success path every executor is joined
    /// before returning.
    ///
    /// An empty batch returns `Ok(vec![])` immediately without validating the
    /// worker count or invoking `worker_fn`.
    pub async fn run<T, R, F, Fut>(&self, tasks: Vec<T>, worker_fn: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.run_detailed(tasks, worker_fn).await.map(|(results, _)| results)
    }

    /// Same as [`run`](BatchRunner::run), additionally returning a
    /// [`BatchSummary`] on the success path.
    #[instrument(skip(self, tasks, worker_fn), fields(task_count = tasks.len()))]
    pub async fn run_detailed<T, R, F, Fut>(
        &self,
        tasks: Vec<T>,
        worker_fn: F,
    ) -> Result<(Vec<R>, BatchSummary)>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let nr_tasks = tasks.len();

        if tasks.is_empty() {
            debug!(%batch_id, "empty batch, nothing to run");
            return Ok((
                Vec::new(),
                BatchSummary {
                    batch_id,
                    started_at,
                    duration: start.elapsed(),
                    task_count: 0,
                    worker_count: 0,
                    results_collected: 0,
                },
            ));
        }

        let nr_workers = self.workers.resolve(nr_tasks)?;
        info!(%batch_id, tasks = nr_tasks, workers = nr_workers, "starting batch");

        let queue = TaskQueue::seed(tasks);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        // Executors watch a per-run abandon flag rather than the external
        // cancel handle, so a failed batch does not poison the runner for
        // subsequent batches. External cancellation reaches the executors
        // through the collector tripping this flag.
        let abandon = CancelHandle::new();

        let handles = spawn_executors(
            nr_workers,
            queue,
            outcome_tx,
            abandon.subscribe(),
            Arc::new(worker_fn),
        );

        match collect(nr_tasks, outcome_rx, self.cancel.subscribe()).await {
            Ok(results) => {
                // Success path: synchronize on executor termination so no
                // background work outlives the call.
                for joined in future::join_all(handles).await {
                    joined?;
                }

                let summary = BatchSummary {
                    batch_id,
                    started_at,
                    duration: start.elapsed(),
                    task_count: nr_tasks,
                    worker_count: nr_workers,
                    results_collected: results.len(),
                };
                info!(%batch_id, results = results.len(),
                    duration_ms = summary.duration.as_millis() as u64, "batch complete");

                Ok((results, summary))
            }
            Err(err) => {
                // Stop executors from claiming further tasks; invocations
                // already in flight complete in the background and their
                // outcomes are dropped.
                abandon.cancel();
                warn!(%batch_id, error = %err, "batch aborted, abandoning in-flight executors");
                Err(err)
            }
        }
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}
