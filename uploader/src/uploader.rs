//! The upload seam shared by the startup sync and the coalescer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::UploadError;

/// Result of a single upload attempt.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The request went out and a response came back.
    Completed {
        /// URL the file was sent to.
        url: String,
        /// Response status.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },

    /// The file no longer existed when the upload ran.
    Skipped { path: PathBuf },

    /// Reading the file or talking to the remote failed.
    Failed { path: PathBuf, error: UploadError },
}

impl UploadOutcome {
    /// Whether the remote accepted the file with a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { status, .. } if status.is_success())
    }

    /// Whether the upload was skipped because the file vanished.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Sends one file to the configured destination.
///
/// Implementations perform at most one network call per invocation, log the
/// result themselves, and never retry.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the file at `path`.
    async fn upload(&self, path: &Path) -> UploadOutcome;
}
