//! # dirmirror
//!
//! Mirrors a local directory to an HTTP endpoint: every file written in the
//! directory is uploaded, at most once per coalescing window.
//!
//! ```rust,ignore
//! use clap::Parser;
//! use dirmirror_cli::{Cli, Mirror};
//!
//! let config = Cli::parse().into_config()?;
//! let mirror = Mirror::start(config).await?;
//! mirror.wait().await;
//! ```

pub mod args;
pub mod config;
pub mod startup;
pub mod supervisor;

pub use args::Cli;
pub use config::{ConfigError, MirrorConfig};
pub use startup::{StartupSyncReport, SyncError, sync_directory};
pub use supervisor::Mirror;
