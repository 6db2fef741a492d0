//! Upload destination configuration.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use reqwest::Method;

use crate::error::{Result, UploadError};

/// Basic-auth credentials for the remote endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,

    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from a user and password.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Whether both the user and the password are empty.
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.password.is_empty()
    }
}

impl FromStr for Credentials {
    type Err = UploadError;

    /// Parse `<user>:<password>`. Exactly one `:` is allowed.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(user), Some(password), None) => Ok(Self::new(user, password)),
            _ => Err(UploadError::InvalidCredentials),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how changed files are uploaded.
///
/// Resolved once at startup and shared read-only by every upload.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Destination base URL.
    pub url: String,

    /// Whether to append the file's base name to `url`.
    pub append_file_name: bool,

    /// Optional basic-auth credentials.
    pub credentials: Option<Credentials>,

    /// HTTP method used for every upload.
    pub method: Method,
}

impl UploadTarget {
    /// Create a target that PUTs files under `url`, appending their base name.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            append_file_name: true,
            credentials: None,
            method: Method::PUT,
        }
    }

    /// Set whether the file's base name is appended to the URL.
    pub fn with_append_file_name(mut self, append: bool) -> Self {
        self.append_file_name = append;
        self
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the HTTP method from its name, e.g. `"POST"`.
    pub fn with_method_name(self, name: &str) -> Result<Self> {
        let method = Method::from_bytes(name.as_bytes())
            .map_err(|_| UploadError::InvalidMethod(name.to_string()))?;
        Ok(self.with_method(method))
    }

    /// Resolve the request URL for `path`.
    pub fn url_for(&self, path: &Path) -> String {
        if !self.append_file_name {
            return self.url.clone();
        }

        let base_name = path
            .file_name()
            .map(OsStr::to_string_lossy)
            .unwrap_or_default();

        if self.url.ends_with('/') {
            format!("{}{base_name}", self.url)
        } else {
            format!("{}/{base_name}", self.url)
        }
    }
}
