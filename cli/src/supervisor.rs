//! Wires the startup sync, the watch and the coalescer together.

use std::sync::Arc;

use anyhow::{Context, Result};
use dirmirror_uploader::HttpUploader;
use dirmirror_watcher::{ChangeSource, Coalescer, CoalescerStats};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::MirrorConfig;
use crate::startup::sync_directory;

/// A running mirror: the watch registration plus its coalescer task.
pub struct Mirror {
    /// Watch registration; dropping it closes the change streams.
    source: ChangeSource,

    /// Cancels the coalescer.
    shutdown: CancellationToken,

    /// Coalescer task.
    task: JoinHandle<CoalescerStats>,
}

impl Mirror {
    /// Start mirroring `config.dir`.
    ///
    /// Runs the initial sync (if enabled) to completion before the watch is
    /// registered. Fails if the directory can't be listed or watched.
    pub async fn start(config: MirrorConfig) -> Result<Self> {
        info!("dir: {}", config.dir.display());
        info!("url: {}", config.target.url);

        let uploader = Arc::new(
            HttpUploader::new(config.target, config.accept_invalid_certs)
                .context("failed to create HTTP client")?,
        );

        if config.initial_sync {
            sync_directory(&config.dir, uploader.as_ref()).await?;
        }

        let (source, streams) = ChangeSource::watch(&config.dir)
            .with_context(|| format!("failed to watch {}", config.dir.display()))?;

        let shutdown = CancellationToken::new();
        let coalescer = Coalescer::new(uploader).with_window(config.window);
        let task = tokio::spawn(coalescer.run(streams, shutdown.child_token()));

        Ok(Self {
            source,
            shutdown,
            task,
        })
    }

    /// Token that stops the mirror when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wait for the coalescer to stop, then release the watch.
    ///
    /// The coalescer stops when the shutdown token is cancelled or the change
    /// streams close.
    pub async fn wait(self) -> CoalescerStats {
        let Mirror { source, task, .. } = self;

        let stats = match task.await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Coalescer task failed: {e}");
                CoalescerStats::default()
            }
        };

        info!("Stopped watching {}", source.dir().display());
        stats
    }

    /// Stop the coalescer and release the watch.
    pub async fn shutdown(self) -> CoalescerStats {
        self.shutdown.cancel();
        self.wait().await
    }
}
