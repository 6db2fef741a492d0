//! Change source backed by notify.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Result, WatcherError};
use crate::event::ChangeEvent;

/// Capacity of the event and error channels.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Sending half of the change channels.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    events: mpsc::Sender<ChangeEvent>,
    errors: mpsc::Sender<WatcherError>,
}

impl ChangeFeed {
    /// Send an event, waiting for channel capacity.
    #[doc(hidden)]
    pub async fn send(&self, event: ChangeEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Report an error from the change source.
    #[cfg(test)]
    pub(crate) async fn report(&self, error: WatcherError) -> bool {
        self.errors.send(error).await.is_ok()
    }

    /// Close the event channel, keeping the error channel open.
    #[cfg(test)]
    pub(crate) fn into_errors_only(self) -> mpsc::Sender<WatcherError> {
        self.errors
    }

    /// Forward a raw notify result from the backend thread.
    fn forward(&self, res: notify::Result<notify::Event>) {
        match res {
            Ok(event) => {
                for change in ChangeEvent::from_notify(event) {
                    if let Err(e) = self.events.blocking_send(change) {
                        error!("Failed to send change event: {e}");
                    }
                }
            }
            Err(e) => {
                if let Err(e) = self.errors.blocking_send(e.into()) {
                    error!("Failed to send watch error: {e}");
                }
            }
        }
    }
}

/// Receiving half of the change channels, consumed by the coalescer.
#[derive(Debug)]
pub struct ChangeStreams {
    /// Change events.
    pub events: mpsc::Receiver<ChangeEvent>,

    /// Errors reported by the change source.
    pub errors: mpsc::Receiver<WatcherError>,
}

impl ChangeStreams {
    /// Create connected change channels.
    pub fn channel(capacity: usize) -> (ChangeFeed, ChangeStreams) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (error_tx, error_rx) = mpsc::channel(capacity);

        (
            ChangeFeed {
                events: event_tx,
                errors: error_tx,
            },
            ChangeStreams {
                events: event_rx,
                errors: error_rx,
            },
        )
    }
}

/// Watch registration on a single directory.
///
/// The watch is flat: entries inside subdirectories are not reported.
/// Dropping the source unregisters the watch and closes the channels.
pub struct ChangeSource {
    /// Watched directory.
    dir: PathBuf,

    /// Internal notify watcher.
    watcher: RecommendedWatcher,
}

impl ChangeSource {
    /// Register a watch on `dir` and return the streams it feeds.
    pub fn watch(dir: impl Into<PathBuf>) -> Result<(Self, ChangeStreams)> {
        let dir = dir.into();

        if !dir.exists() {
            return Err(WatcherError::DirectoryNotFound(dir.display().to_string()));
        }

        if !dir.is_dir() {
            return Err(WatcherError::NotADirectory(dir.display().to_string()));
        }

        let (feed, streams) = ChangeStreams::channel(CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| feed.forward(res),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("Watching directory: {}", dir.display());
        Ok((Self { dir, watcher }, streams))
    }

    /// Get the watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for ChangeSource {
    fn drop(&mut self) {
        match self.watcher.unwatch(&self.dir) {
            Ok(()) => debug!("Stopped watching: {}", self.dir.display()),
            Err(e) => debug!("Failed to unwatch {}: {e}", self.dir.display()),
        }
    }
}
