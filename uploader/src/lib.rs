//! # Uploader
//!
//! This crate sends changed files to the remote endpoint that dirmirror
//! mirrors a directory into.
//!
//! ## Features
//!
//! - **Configurable Target**: Base URL, optional base-name suffix, HTTP method
//! - **Basic Auth**: Optional `<user>:<password>` credentials
//! - **Best Effort**: One request per upload, outcomes are logged, never retried
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Uploader                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  UploadTarget ──► HttpUploader ──► UploadOutcome               │
//! │       │                │                                        │
//! │       ▼                ▼                                        │
//! │  Credentials     reqwest::Client                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod http;
pub mod target;
pub mod uploader;

pub use error::{Result, UploadError};
pub use http::HttpUploader;
pub use target::{Credentials, UploadTarget};
pub use uploader::{UploadOutcome, Uploader};

// Re-exported so callers can name methods and statuses without a direct
// reqwest dependency.
pub use reqwest::{Method, StatusCode};
