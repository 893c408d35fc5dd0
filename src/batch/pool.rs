use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::batch::queue::TaskQueue;
use crate::batch::types::TaskOutcome;
use crate::Result;

/// Spawn exactly `n` detached executors over a seeded queue.
///
/// Each executor loops: observe the cancel flag, claim a task, invoke the
/// worker function, publish the outcome. A per-task failure is captured into
/// an outcome and never breaks the loop; the executor keeps claiming until
/// the queue is empty, the cancel flag trips, or the collector has gone away
/// (outcome send fails).
///
/// Returns the join handles so the runner can synchronize termination on the
/// success path. On the failure path the handles are simply dropped and the
/// executors finish (or are abandoned) in the background.
pub(crate) fn spawn_executors<T, R, F, Fut>(
    n: usize,
    queue: Arc<TaskQueue<T>>,
    outcomes: mpsc::UnboundedSender<TaskOutcome<R>>,
    cancel: watch::Receiver<bool>,
    worker_fn: Arc<F>,
) -> Vec<JoinHandle<usize>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(n);

    for executor_id in 0..n {
        let queue = Arc::clone(&queue);
        let outcomes = outcomes.clone();
        let cancel = cancel.clone();
        let worker_fn = Arc::clone(&worker_fn);

        handles.push(tokio::spawn(async move {
            run_executor(executor_id, queue, outcomes, cancel, worker_fn).await
        }));
    }

    handles
}

async fn run_executor<T, R, F, Fut>(
    executor_id: usize,
    queue: Arc<TaskQueue<T>>,
    outcomes: mpsc::UnboundedSender<TaskOutcome<R>>,
    cancel: watch::Receiver<bool>,
    worker_fn: Arc<F>,
) -> usize
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut processed = 0usize;

    loop {
        // Cancellation is observed between tasks only; a running invocation
        // always completes.
        if *cancel.borrow() {
            debug!(executor_id, processed, "executor stopping: batch cancelled");
            break;
        }

        let Some(task) = queue.claim() else {
            trace!(executor_id, processed, "executor stopping: queue exhausted");
            break;
        };

        let outcome = match worker_fn(task).await {
            Ok(value) => TaskOutcome::Success(value),
            Err(err) => {
                debug!(executor_id, error = %err, "task failed");
                TaskOutcome::Failure(err)
            }
        };

        processed += 1;

        if outcomes.send(outcome).is_err() {
            // Collector already returned (failure path); nothing left to do.
            debug!(executor_id, processed, "executor stopping: collector gone");
            break;
        }
    }

    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FanoutError;

    fn worker(n: u32) -> impl Future<Output = Result<u32>> {
        async move {
            if n == 2 {
                Err(FanoutError::Task(format!("worker refused input {}", n)))
            } else {
                Ok(n * 10)
            }
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_break_the_executor_loop() {
        let queue = TaskQueue::seed(vec![1u32, 2, 3]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let handles = spawn_executors(1, queue, tx, cancel_rx, Arc::new(worker));

        let mut successes = 0;
        let mut failures = 0;
        for _ in 0..3 {
            match rx.recv().await.expect("three outcomes expected") {
                TaskOutcome::Success(_) => successes += 1,
                TaskOutcome::Failure(_) => failures += 1,
            }
        }

        assert_eq!(successes, 2);
        assert_eq!(failures, 1);

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 3);
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_claiming_between_tasks() {
        let queue = TaskQueue::seed((0..100u32).collect());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        // Tripped before the executor starts: it must exit without claiming.
        cancel_tx.send(true).unwrap();

        let queue_ref = Arc::clone(&queue);
        let handles = spawn_executors(2, queue, tx, cancel_rx, Arc::new(|n: u32| async move { Ok(n) }));

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 0);
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(queue_ref.remaining(), 100);
    }

    #[tokio::test]
    async fn test_idle_executors_exit_on_empty_queue() {
        let queue: Arc<TaskQueue<u32>> = TaskQueue::seed(vec![]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let handles = spawn_executors(4, queue, tx, cancel_rx, Arc::new(|n: u32| async move { Ok(n) }));

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 0);
        }
    }
}
