//! # Fanout
//!
//! A small generic engine for running one batch of independent tasks across a
//! bounded pool of concurrent workers, collecting the results, and propagating
//! the first failure to the caller without silently losing it.
//!
//! ## Overview
//!
//! A batch is a finite list of opaque tasks plus a caller-supplied worker
//! function. The runner seeds a shared pending queue, spawns N executors that
//! each pull tasks until the queue is empty, and drains a shared outcome
//! channel until either every task has reported or the first failure arrives.
//! On failure the caller is unblocked immediately; in-flight workers are
//! abandoned rather than awaited.
//!
//! ## Quick Start
//!
//! ```rust
//! use fanout::batch::{BatchRunner, WorkerCount};
//!
//! # async fn example() -> fanout::Result<()> {
//! let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(2));
//!
//! let doubled = runner
//!     .run(vec![1u32, 2, 3, 4, 5], |n| async move { Ok(n * 2) })
//!     .await?;
//!
//! assert_eq!(doubled.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Properties
//!
//! - **Exactly-once dispatch**: every task is claimed by exactly one executor.
//! - **Fail fast**: the first task failure aborts the batch from the caller's
//!   perspective; no partial result list is ever returned alongside an error.
//! - **Per-task failure isolation**: a failing task never kills its executor's
//!   loop; remaining tasks keep draining.
//! - **Interruptible waits**: the collector observes an external cancellation
//!   flag while waiting, so a user-requested abort surfaces promptly.
//!
//! ## Modules
//!
//! - [`batch`]: the pending queue, executor pool, collector, and runner
//! - [`upload`]: a thin caller that mirrors a whole directory tree into an
//!   object store bucket using the batch runner (S3 client behind the `s3`
//!   cargo feature)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for fanout operations
pub type Result<T> = std::result::Result<T, FanoutError>;

/// Main error type for fanout operations
#[derive(Error, Debug)]
pub enum FanoutError {
    /// Invalid batch configuration (e.g. zero workers for a non-empty batch);
    /// raised synchronously before any executor starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure raised by the worker function while processing one task
    #[error("Task failed: {0}")]
    Task(String),

    /// The batch was cancelled externally while waiting for outcomes
    #[error("Batch cancelled")]
    Cancelled,

    /// The outcome channel closed before every task was accounted for
    #[error("Outcome channel closed with {missing} task(s) unaccounted for")]
    ChannelClosed {
        /// Number of tasks whose outcome never arrived
        missing: usize,
    },

    /// Join error from async executor tasks on the success path
    #[error("Async join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// I/O error from local filesystem operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploader-side errors
    #[error("Upload error: {0}")]
    Upload(#[from] upload::UploadError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Batch execution engine: queue, executor pool, collector, and runner
pub mod batch;

/// Directory-tree upload built on top of the batch runner
pub mod upload;
