//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use dirmirror_uploader::{Credentials, UploadTarget};

use crate::config::{ConfigError, MirrorConfig};

/// Watch a directory and upload changed files to an HTTP endpoint.
#[derive(Debug, Parser)]
#[command(name = "dirmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to sync
    #[arg(long)]
    pub dir: PathBuf,

    /// Target URL where to sync files to (e.g. "http://192.168.200.1:3001/rsc/")
    #[arg(long)]
    pub url: String,

    /// Basic authentication in the form "<user>:<pwd>"
    #[arg(long)]
    pub auth: Option<String>,

    /// Append file name to URL
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub append: bool,

    /// HTTP method to use
    #[arg(long, default_value = "PUT")]
    pub method: String,

    /// Synchronize the whole directory on start
    #[arg(short = 's', long, default_value_t = true, action = ArgAction::Set)]
    pub sync_on_start: bool,

    /// Allow insecure connections with untrusted host certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Coalescing window in milliseconds
    #[arg(long, default_value_t = 100)]
    pub window_ms: u64,
}

impl Cli {
    /// Resolve and validate the configuration.
    pub fn into_config(self) -> Result<MirrorConfig, ConfigError> {
        let Cli {
            dir,
            url,
            auth,
            append,
            method,
            sync_on_start,
            insecure,
            window_ms,
        } = self;

        let mut target = UploadTarget::new(url)
            .with_append_file_name(append)
            .with_method_name(&method)
            .map_err(|_| ConfigError::InvalidMethod(method))?;

        if let Some(auth) = auth.filter(|auth| !auth.is_empty()) {
            let credentials: Credentials =
                auth.parse().map_err(|_| ConfigError::InvalidCredentials)?;
            target = target.with_credentials(credentials);
        }

        let config = MirrorConfig::new(dir, target)
            .with_initial_sync(sync_on_start)
            .with_accept_invalid_certs(insecure)
            .with_window(Duration::from_millis(window_ms));

        config.validate()?;
        Ok(config)
    }
}
