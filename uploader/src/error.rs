//! Error types for the uploader.

use thiserror::Error;

/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;

/// Errors that can occur while configuring or performing an upload.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Credentials not given as `<user>:<password>`.
    #[error("credentials must be given as \"<user>:<password>\"")]
    InvalidCredentials,

    /// HTTP method token could not be parsed.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
