use tokio::sync::{mpsc, watch};
use tracing::{trace, warn};

use crate::batch::types::TaskOutcome;
use crate::{FanoutError, Result};

/// Drain the outcome channel until one outcome per task has arrived or the
/// first failure is observed.
///
/// Success values are returned in arrival order, which carries no relation to
/// submission order. The first failure dequeued wins: it is returned
/// immediately and any outcomes still queued or in flight are discarded. The
/// wait is interruptible; if the cancel flag trips while waiting, the
/// collector returns [`FanoutError::Cancelled`] rather than blocking until
/// task completion.
pub(crate) async fn collect<R>(
    nr_tasks: usize,
    mut outcomes: mpsc::UnboundedReceiver<TaskOutcome<R>>,
    mut cancel: watch::Receiver<bool>,
) -> Result<Vec<R>> {
    if *cancel.borrow() {
        return Err(FanoutError::Cancelled);
    }

    let mut results = Vec::with_capacity(nr_tasks);
    let mut cancel_open = true;

    while results.len() < nr_tasks {
        tokio::select! {
            outcome = outcomes.recv() => match outcome {
                Some(TaskOutcome::Success(value)) => {
                    results.push(value);
                    trace!(collected = results.len(), total = nr_tasks, "outcome collected");
                }
                Some(TaskOutcome::Failure(err)) => {
                    warn!(collected = results.len(), total = nr_tasks, error = %err,
                        "first failure observed, aborting batch");
                    return Err(err);
                }
                None => {
                    // Every executor dropped its sender without accounting
                    // for all tasks. Reachable only if an executor panicked.
                    let missing = nr_tasks - results.len();
                    return Err(FanoutError::ChannelClosed { missing });
                }
            },
            changed = cancel.changed(), if cancel_open => match changed {
                Ok(()) if *cancel.borrow() => return Err(FanoutError::Cancelled),
                Ok(()) => {}
                // Cancel handle dropped; keep draining outcomes only.
                Err(_) => cancel_open = false,
            },
        }
    }

    Ok(results)
}
