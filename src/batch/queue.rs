use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Concurrency-safe pending-task queue, seeded once before executors start.
///
/// Multiple executors call [`claim`](TaskQueue::claim) concurrently; each task
/// is handed out exactly once. Once the queue is empty, `claim` returns `None`
/// immediately rather than blocking for more work.
#[derive(Debug)]
pub struct TaskQueue<T> {
    pending: Mutex<VecDeque<T>>,
}

impl<T> TaskQueue<T> {
    /// Seed the queue with every task of the batch.
    pub fn seed(tasks: Vec<T>) -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(tasks.into()),
        })
    }

    /// Claim the next pending task, or `None` when the queue is exhausted.
    pub fn claim(&self) -> Option<T> {
        self.pending.lock().pop_front()
    }

    /// Number of tasks not yet claimed.
    pub fn remaining(&self) -> usize {
        self.pending.lock().len()
    }
}
