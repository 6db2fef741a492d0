//! HTTP uploader backed by reqwest.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::{Result, UploadError};
use crate::target::UploadTarget;
use crate::uploader::{UploadOutcome, Uploader};

/// Uploads files to an [`UploadTarget`] over HTTP.
pub struct HttpUploader {
    /// Destination configuration.
    target: Arc<UploadTarget>,

    /// HTTP client.
    client: reqwest::Client,
}

impl HttpUploader {
    /// Create a new HTTP uploader.
    ///
    /// When `accept_invalid_certs` is set, TLS certificates are not verified.
    pub fn new(target: UploadTarget, accept_invalid_certs: bool) -> Result<Self> {
        if accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            target: Arc::new(target),
            client,
        })
    }

    fn failed(path: &Path, error: UploadError) -> UploadOutcome {
        UploadOutcome::Failed {
            path: path.to_path_buf(),
            error,
        }
    }

    fn skipped(path: &Path) -> UploadOutcome {
        debug!("Skipping upload, file no longer exists: {}", path.display());
        UploadOutcome::Skipped {
            path: PathBuf::from(path),
        }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, path: &Path) -> UploadOutcome {
        // The file may have been removed between the event and the flush.
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Self::skipped(path);
        }

        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::skipped(path),
            Err(e) => {
                error!("Error while opening {}: {e}", path.display());
                return Self::failed(path, e.into());
            }
        };

        let url = self.target.url_for(path);
        debug!(
            "Sending {} {url} ({} bytes)",
            self.target.method,
            content.len()
        );

        let mut request = self
            .client
            .request(self.target.method.clone(), &url)
            .body(content);

        if let Some(credentials) = self
            .target
            .credentials
            .as_ref()
            .filter(|credentials| !credentials.is_empty())
        {
            request = request.basic_auth(&credentials.user, Some(&credentials.password));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Error sending {} request to {url}: {e}", self.target.method);
                return Self::failed(path, e.into());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Error while reading response body from {url}: {e}");
                return Self::failed(path, e.into());
            }
        };

        if status.is_success() {
            info!("{url} {status} {body}");
        } else {
            warn!("{url} {status} {body}");
        }

        UploadOutcome::Completed { url, status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::target::Credentials;

    async fn mock_server(expected: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
            .expect(expected)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_upload_sends_file_content() {
        let server = mock_server(1).await;
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "firmware v2").unwrap();

        let target = UploadTarget::new(format!("{}/rsc", server.uri()));
        let uploader = HttpUploader::new(target, false).unwrap();

        let outcome = uploader.upload(&file).await;
        assert!(outcome.is_success());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/rsc/a.txt");
        assert_eq!(requests[0].body, b"firmware v2".to_vec());
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_upload_without_appended_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.json");
        std::fs::write(&file, "{}").unwrap();

        let target = UploadTarget::new(format!("{}/upload", server.uri()))
            .with_append_file_name(false)
            .with_method_name("POST")
            .unwrap();
        let uploader = HttpUploader::new(target, false).unwrap();

        match uploader.upload(&file).await {
            UploadOutcome::Completed { status, .. } => assert_eq!(status, StatusCode::CREATED),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_sends_basic_auth() {
        let server = mock_server(1).await;
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let credentials: Credentials = "alice:secret".parse().unwrap();
        let target = UploadTarget::new(server.uri()).with_credentials(credentials);
        let uploader = HttpUploader::new(target, false).unwrap();
        uploader.upload(&file).await;

        let requests = server.received_requests().await.unwrap();
        let header = requests[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap();
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, "alice:secret");
    }

    #[tokio::test]
    async fn test_upload_omits_empty_basic_auth() {
        let server = mock_server(1).await;
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let credentials: Credentials = ":".parse().unwrap();
        let target = UploadTarget::new(server.uri()).with_credentials(credentials);
        let uploader = HttpUploader::new(target, false).unwrap();
        assert!(uploader.upload(&file).await.is_success());

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_upload_skips_missing_file() {
        let server = mock_server(0).await;
        let temp_dir = TempDir::new().unwrap();

        let uploader = HttpUploader::new(UploadTarget::new(server.uri()), false).unwrap();
        let outcome = uploader.upload(&temp_dir.path().join("gone.txt")).await;

        assert!(outcome.is_skipped());
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_reports_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let uploader = HttpUploader::new(UploadTarget::new(server.uri()), false).unwrap();
        let outcome = uploader.upload(&file).await;

        assert!(!outcome.is_success());
        match outcome {
            UploadOutcome::Completed { body, .. } => assert_eq!(body, "disk full"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_reports_transport_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let uploader = HttpUploader::new(UploadTarget::new(uri), false).unwrap();
        let outcome = uploader.upload(&file).await;

        assert!(matches!(
            outcome,
            UploadOutcome::Failed {
                error: UploadError::Http(_),
                ..
            }
        ));
    }
}
