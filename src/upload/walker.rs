use std::fs;
use std::path::Path;

use tracing::debug;

use crate::upload::types::{FileTask, UploadError};

/// Recursively list every regular file under `root`, sorted ascending by
/// size and enumerated into [`FileTask`]s.
///
/// Smallest-first ordering front-loads the cheap uploads so progress output
/// moves early in a fresh run. Symlinks are followed through `fs::metadata`;
/// an unreadable entry aborts the walk.
pub fn collect_files(root: &Path) -> Result<Vec<FileTask>, UploadError> {
    let mut files = Vec::new();
    walk(root, &mut files)?;

    files.sort_by_key(|(_, size)| *size);
    debug!(root = %root.display(), files = files.len(), "source tree listed");

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(index, (path, size))| FileTask { index, path, size })
        .collect())
}

fn walk(dir: &Path, files: &mut Vec<(std::path::PathBuf, u64)>) -> Result<(), UploadError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = fs::metadata(&path)?;

        if metadata.is_dir() {
            walk(&path, files)?;
        } else if metadata.is_file() {
            files.push((path, metadata.len()));
        }
    }
    Ok(())
}
