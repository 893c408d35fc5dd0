use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::process::Command;
use tracing::{info, instrument};

use crate::batch::{BatchRunner, CancelHandle};
use crate::upload::progress::ProgressReporter;
use crate::upload::store::RemoteStore;
use crate::upload::types::{FileTask, UploadConfig, UploadError, UploadReport, UploadStatus};
use crate::upload::walker;
use crate::Result;

/// Mirrors a local directory tree into an object-store bucket.
///
/// Thin caller of the batch runner: one [`FileTask`] per file, a worker
/// function that checks remote existence and shells out to the upload
/// command, smallest files first. A single failed upload aborts the whole
/// run with that failure.
pub struct TreeUploader<S: RemoteStore + 'static> {
    config: Arc<UploadConfig>,
    store: Arc<S>,
    runner: BatchRunner,
}

impl<S: RemoteStore + 'static> TreeUploader<S> {
    /// Build an uploader over a remote store.
    pub fn new(config: UploadConfig, store: S) -> Self {
        let runner = BatchRunner::new().with_workers(config.workers);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            runner,
        }
    }

    /// Handle for aborting the run (e.g. from a SIGINT handler).
    pub fn cancel_handle(&self) -> CancelHandle {
        self.runner.cancel_handle()
    }

    /// Walk the source tree and upload every file that is missing remotely.
    #[instrument(skip(self), fields(root = %self.config.source_root.display(), bucket = %self.config.bucket))]
    pub async fn run(&self) -> Result<UploadReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let files = walker::collect_files(&self.config.source_root)?;
        let total_files = files.len();
        info!(total_files, "starting tree upload");

        let progress = Arc::new(ProgressReporter::stderr(
            total_files,
            self.config.progress_interval,
        ));

        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);

        let statuses = self
            .runner
            .run(files, move |task: FileTask| {
                let config = Arc::clone(&config);
                let store = Arc::clone(&store);
                let progress = Arc::clone(&progress);
                async move { upload_one(&config, store.as_ref(), &progress, task).await }
            })
            .await?;

        let report = UploadReport {
            total_files,
            uploaded: statuses.iter().filter(|s| **s == UploadStatus::Uploaded).count(),
            already_present: statuses
                .iter()
                .filter(|s| **s == UploadStatus::AlreadyPresent)
                .count(),
            filtered: statuses.iter().filter(|s| **s == UploadStatus::Filtered).count(),
            started_at,
            duration: start.elapsed(),
        };

        info!(
            uploaded = report.uploaded,
            already_present = report.already_present,
            filtered = report.filtered,
            duration_ms = report.duration.as_millis() as u64,
            "tree upload complete"
        );

        Ok(report)
    }
}

/// Derive the remote key for a local file: the path relative to the source
/// root, with platform separators normalized to `/`.
pub fn remote_key(root: &Path, path: &Path) -> std::result::Result<String, UploadError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| UploadError::OutsideRoot(path.to_path_buf()))?;

    let key = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(key)
}

async fn upload_one<S: RemoteStore + ?Sized>(
    config: &UploadConfig,
    store: &S,
    progress: &ProgressReporter,
    task: FileTask,
) -> Result<UploadStatus> {
    progress.checkpoint(task.index);

    let key = remote_key(&config.source_root, &task.path)?;

    if !config.skip_substring.is_empty() && key.contains(&config.skip_substring) {
        return Ok(UploadStatus::Filtered);
    }

    if store.exists(&key).await? {
        return Ok(UploadStatus::AlreadyPresent);
    }

    progress.note(&format!(
        "Uploading {}: {} -> {}",
        task.index,
        task.path.display(),
        key
    ));

    let destination = format!("s3://{}/{}", config.bucket, key);
    let status = Command::new(&config.upload_command)
        .arg("put")
        .arg(&task.path)
        .arg(&destination)
        .status()
        .await
        .map_err(|e| UploadError::CommandFailed {
            key: key.clone(),
            detail: format!("failed to spawn {}: {}", config.upload_command, e),
        })?;

    if !status.success() {
        return Err(UploadError::CommandFailed {
            key,
            detail: format!("exit status {}", status),
        }
        .into());
    }

    Ok(UploadStatus::Uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_remote_key_strips_the_root_prefix() {
        let key = remote_key(
            Path::new("/var/cache/store"),
            Path::new("/var/cache/store/nar/abc123.nar.xz"),
        )
        .unwrap();
        assert_eq!(key, "nar/abc123.nar.xz");
    }

    #[test]
    fn test_remote_key_rejects_paths_outside_the_root() {
        let err = remote_key(Path::new("/var/cache/store"), Path::new("/etc/passwd")).unwrap_err();
        match err {
            UploadError::OutsideRoot(path) => assert_eq!(path, PathBuf::from("/etc/passwd")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
