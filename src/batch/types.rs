use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FanoutError, Result};

/// Number of concurrent executors to run for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerCount {
    /// One executor per task in the batch
    Auto,
    /// A fixed number of executors
    Fixed(usize),
}

impl WorkerCount {
    /// Resolve to an effective executor count for a batch of `nr_tasks`.
    ///
    /// `Auto` resolves to one executor per task. A resolved count below 1 is
    /// a configuration error; callers must check for the empty batch before
    /// resolving (an empty batch never spawns executors and skips validation).
    pub fn resolve(self, nr_tasks: usize) -> Result<usize> {
        let n = match self {
            WorkerCount::Auto => nr_tasks,
            WorkerCount::Fixed(n) => n,
        };

        if n < 1 {
            return Err(FanoutError::Configuration(format!(
                "worker count must be at least 1 for a non-empty batch (requested {}, tasks {})",
                n, nr_tasks
            )));
        }

        Ok(n)
    }

    /// Interpret a signed command-line style flag: `-1` means `Auto`, any
    /// other value is taken as a fixed count (negative values resolve to a
    /// configuration error for non-empty batches, matching `Fixed(0)`).
    pub fn from_flag(flag: i64) -> Self {
        if flag == -1 {
            WorkerCount::Auto
        } else {
            WorkerCount::Fixed(flag.max(0) as usize)
        }
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        WorkerCount::Fixed(num_cpus::get())
    }
}

/// Outcome of processing one task: the worker function's return value or its
/// captured failure. Produced once per task, consumed once by the collector.
#[derive(Debug)]
pub enum TaskOutcome<R> {
    /// The worker function returned a value
    Success(R),
    /// The worker function failed
    Failure(FanoutError),
}

/// Summary of one finished batch, for logging and reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Identity of this batch run
    pub batch_id: Uuid,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the batch
    pub duration: Duration,
    /// Number of tasks submitted
    pub task_count: usize,
    /// Effective number of executors spawned
    pub worker_count: usize,
    /// Number of results collected (equals `task_count` on the success path)
    pub results_collected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolves_to_task_count() {
        assert_eq!(WorkerCount::Auto.resolve(7).unwrap(), 7);
    }

    #[test]
    fn test_fixed_resolves_to_itself() {
        assert_eq!(WorkerCount::Fixed(3).resolve(100).unwrap(), 3);
    }

    #[test]
    fn test_zero_workers_is_a_configuration_error() {
        let err = WorkerCount::Fixed(0).resolve(1).unwrap_err();
        assert!(matches!(err, FanoutError::Configuration(_)));
    }

    #[test]
    fn test_from_flag_sentinel() {
        assert_eq!(WorkerCount::from_flag(-1), WorkerCount::Auto);
        assert_eq!(WorkerCount::from_flag(4), WorkerCount::Fixed(4));
        assert_eq!(WorkerCount::from_flag(-2), WorkerCount::Fixed(0));
    }

    #[test]
    fn test_default_is_at_least_one() {
        match WorkerCount::default() {
            WorkerCount::Fixed(n) => assert!(n >= 1),
            WorkerCount::Auto => panic!("default should be a fixed count"),
        }
    }
}
