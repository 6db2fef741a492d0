//! One-shot upload of a directory's files at startup.

use std::path::{Path, PathBuf};

use dirmirror_uploader::Uploader;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Listing the directory failed; without it there is no known starting state.
#[derive(Error, Debug)]
#[error("failed to read directory {}: {source}", path.display())]
pub struct SyncError {
    /// Directory being listed.
    pub path: PathBuf,

    /// Underlying error.
    #[source]
    pub source: std::io::Error,
}

/// Result of a startup sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupSyncReport {
    /// Uploads attempted.
    pub uploaded: usize,

    /// Uploads the remote accepted.
    pub succeeded: usize,

    /// Subdirectories skipped.
    pub skipped_dirs: usize,
}

/// Upload every non-directory entry of `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that vanish while the
/// directory is listed are skipped. Upload failures are logged by the
/// uploader and counted; only listing errors are returned.
pub async fn sync_directory<U: Uploader + ?Sized>(
    dir: &Path,
    uploader: &U,
) -> Result<StartupSyncReport, SyncError> {
    let list_error = |source| SyncError {
        path: dir.to_path_buf(),
        source,
    };

    info!("Synchronizing {}", dir.display());

    let mut entries = fs::read_dir(dir).await.map_err(list_error)?;
    let mut report = StartupSyncReport::default();
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!("Skipping {}: {e}", entry.path().display());
                continue;
            }
        };

        if file_type.is_dir() {
            debug!("Skipping directory: {}", entry.path().display());
            report.skipped_dirs += 1;
            continue;
        }

        files.push((entry.file_name(), entry.path()));
    }

    files.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    for (_, path) in files {
        let outcome = uploader.upload(&path).await;
        report.uploaded += 1;
        if outcome.is_success() {
            report.succeeded += 1;
        }
    }

    info!(
        "Initial sync finished: {}/{} uploads succeeded",
        report.succeeded, report.uploaded
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use dirmirror_uploader::{StatusCode, UploadOutcome};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingUploader {
        uploads: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl Uploader for RecordingUploader {
        async fn upload(&self, path: &Path) -> UploadOutcome {
            self.uploads.lock().unwrap().push(path.to_path_buf());
            UploadOutcome::Completed {
                url: path.display().to_string(),
                status: StatusCode::OK,
                body: String::new(),
            }
        }
    }

    #[tokio::test]
    async fn test_sync_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("x"), "x").unwrap();
        std::fs::write(temp_dir.path().join("y"), "y").unwrap();
        std::fs::create_dir(temp_dir.path().join("z")).unwrap();
        std::fs::write(temp_dir.path().join("z").join("nested"), "n").unwrap();

        let uploader = RecordingUploader::default();
        let report = sync_directory(temp_dir.path(), &uploader).await.unwrap();

        assert_eq!(
            report,
            StartupSyncReport {
                uploaded: 2,
                succeeded: 2,
                skipped_dirs: 1,
            }
        );

        assert_eq!(
            *uploader.uploads.lock().unwrap(),
            vec![temp_dir.path().join("x"), temp_dir.path().join("y")]
        );
    }

    #[tokio::test]
    async fn test_sync_uploads_in_file_name_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c", "a", "d", "b"] {
            std::fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let uploader = RecordingUploader::default();
        sync_directory(temp_dir.path(), &uploader).await.unwrap();

        let names: Vec<String> = uploader
            .uploads
            .lock()
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sync_continues_past_dangling_entry() {
        let temp_dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("removed"),
            temp_dir.path().join("a-link"),
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("b"), "b").unwrap();

        let uploader = RecordingUploader::default();
        let report = sync_directory(temp_dir.path(), &uploader).await.unwrap();

        assert_eq!(report.skipped_dirs, 0);
        assert_eq!(
            uploader.uploads.lock().unwrap().last(),
            Some(&temp_dir.path().join("b"))
        );
    }

    #[tokio::test]
    async fn test_sync_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let uploader = RecordingUploader::default();

        let result = sync_directory(&temp_dir.path().join("missing"), &uploader).await;
        assert!(result.is_err());
        assert!(uploader.uploads.lock().unwrap().is_empty());
    }
}
