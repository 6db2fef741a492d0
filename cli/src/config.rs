//! Validated runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use dirmirror_uploader::UploadTarget;
use dirmirror_watcher::DEFAULT_WINDOW;
use thiserror::Error;
use url::Url;

/// Startup validation errors. Any of these aborts before the watch starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No directory given.
    #[error("a directory to sync is required")]
    MissingDirectory,

    /// Directory does not exist.
    #[error("directory {0} doesn't exist")]
    DirectoryNotFound(String),

    /// Path is not a directory.
    #[error("{0} is not a directory")]
    NotADirectory(String),

    /// URL could not be parsed.
    #[error("url {url} is invalid: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// URL scheme is not http or https.
    #[error("url {0} must use the http or https scheme")]
    UnsupportedScheme(String),

    /// Credentials not given as `<user>:<password>`.
    #[error("auth not given in form \"<user>:<pwd>\"")]
    InvalidCredentials,

    /// HTTP method token could not be parsed.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Coalescing window of zero.
    #[error("coalescing window must be greater than zero")]
    InvalidWindow,
}

/// Everything the mirror needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory to watch.
    pub dir: PathBuf,

    /// Where uploads go.
    pub target: UploadTarget,

    /// Upload every file in `dir` before watching.
    pub initial_sync: bool,

    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,

    /// Coalescing window.
    pub window: Duration,
}

impl MirrorConfig {
    /// Create a config with an initial sync and the default window.
    pub fn new(dir: impl Into<PathBuf>, target: UploadTarget) -> Self {
        Self {
            dir: dir.into(),
            target,
            initial_sync: true,
            accept_invalid_certs: false,
            window: DEFAULT_WINDOW,
        }
    }

    /// Set whether to upload every file before watching.
    pub fn with_initial_sync(mut self, initial_sync: bool) -> Self {
        self.initial_sync = initial_sync;
        self
    }

    /// Set whether untrusted TLS certificates are accepted.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the coalescing window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Check the directory, URL and window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingDirectory);
        }

        if !self.dir.exists() {
            return Err(ConfigError::DirectoryNotFound(
                self.dir.display().to_string(),
            ));
        }

        if !self.dir.is_dir() {
            return Err(ConfigError::NotADirectory(self.dir.display().to_string()));
        }

        validate_url(&self.target.url)?;

        if self.window.is_zero() {
            return Err(ConfigError::InvalidWindow);
        }

        Ok(())
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::UnsupportedScheme(url.to_string())),
    }
}
