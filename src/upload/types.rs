use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::WorkerCount;

/// One file to mirror into the bucket. The index is the file's position in
/// the size-sorted listing and only drives progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Position in the size-sorted listing
    pub index: usize,
    /// Absolute or root-relative local path
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Configuration for one tree-upload run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Local directory whose contents are mirrored
    pub source_root: PathBuf,
    /// Destination bucket name
    pub bucket: String,
    /// Concurrent upload workers
    pub workers: WorkerCount,
    /// External program invoked as `<command> put <local> s3://<bucket>/<key>`
    pub upload_command: String,
    /// Emit a progress line every this many files (0 disables the counter)
    pub progress_interval: usize,
    /// Keys containing this substring are never uploaded
    pub skip_substring: String,
}

impl UploadConfig {
    /// Configuration with the historical defaults: 15 workers, `s3cmd` as the
    /// upload command, a progress line every 1000 files, and `.tmp` keys
    /// skipped.
    pub fn new(source_root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            bucket: bucket.into(),
            workers: WorkerCount::Fixed(15),
            upload_command: "s3cmd".to_string(),
            progress_interval: 1000,
            skip_substring: ".tmp".to_string(),
        }
    }

    /// Set the worker count policy.
    pub fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Set the external upload program.
    pub fn with_upload_command(mut self, command: impl Into<String>) -> Self {
        self.upload_command = command.into();
        self
    }

    /// Set the progress reporting interval.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    /// The external upload command ran and succeeded
    Uploaded,
    /// The remote store already had the key
    AlreadyPresent,
    /// The key matched the skip substring
    Filtered,
}

/// Summary of one completed tree-upload run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    /// Files found under the source root
    pub total_files: usize,
    /// Files actually uploaded
    pub uploaded: usize,
    /// Files skipped because the key already existed remotely
    pub already_present: usize,
    /// Files skipped by the key filter
    pub filtered: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Errors from the uploader and its remote-store boundary
#[derive(Error, Debug)]
pub enum UploadError {
    /// The remote store could not answer an existence query
    #[error("Remote store error: {0}")]
    Remote(String),

    /// The external upload command exited unsuccessfully
    #[error("Upload command failed for key {key}: {detail}")]
    CommandFailed {
        /// Remote key being uploaded
        key: String,
        /// Exit status or spawn error description
        detail: String,
    },

    /// A listed file does not live under the source root
    #[error("Path {0} is outside the source root")]
    OutsideRoot(PathBuf),

    /// Local filesystem error while walking or uploading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
