//! Event coalescing and upload dispatch.
//!
//! The coalescer owns the pending set for the current window. Incoming
//! events, watch errors, window ticks and shutdown are all handled on a
//! single task, so inserts never race with the swap at a tick.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dirmirror_uploader::Uploader;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::pending::PendingSet;
use crate::source::ChangeStreams;

/// Default coalescing window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// Collapses bursts of change events into one upload per written file per window.
pub struct Coalescer<U: ?Sized> {
    /// Length of a window.
    window: Duration,

    /// Uploader shared with the startup sync.
    uploader: Arc<U>,
}

impl<U: Uploader + ?Sized> Coalescer<U> {
    /// Create a coalescer with the default window.
    pub fn new(uploader: Arc<U>) -> Self {
        Self {
            window: DEFAULT_WINDOW,
            uploader,
        }
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Get the window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run until both streams close or `shutdown` is cancelled.
    ///
    /// Ticks every window, even when nothing is pending. Events still
    /// pending when the loop ends are dropped.
    pub async fn run(self, streams: ChangeStreams, shutdown: CancellationToken) -> CoalescerStats {
        let ChangeStreams {
            mut events,
            mut errors,
        } = streams;
        let mut events_open = true;
        let mut errors_open = true;

        let mut pending = PendingSet::new();
        let mut stats = CoalescerStats::default();

        let tick = time::sleep(self.window);
        tokio::pin!(tick);

        debug!("Coalescer started with a {:?} window", self.window);

        while events_open || errors_open {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("Coalescer shutdown requested");
                    break;
                }
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        trace!("Pending {}", event.identity());
                        stats.events += 1;
                        pending.insert(event);
                    }
                    None => {
                        debug!("Change event channel closed");
                        events_open = false;
                    }
                },
                error = errors.recv(), if errors_open => match error {
                    Some(e) => warn!("Watch error: {e}"),
                    None => {
                        debug!("Watch error channel closed");
                        errors_open = false;
                    }
                },
                () = &mut tick => {
                    let report = self.flush(pending.take()).await;
                    stats.flushes += 1;
                    stats.uploads += report.uploads;
                    tick.as_mut().reset(Instant::now() + self.window);
                }
            }
        }

        if !pending.is_empty() {
            debug!("Dropping {} pending change(s)", pending.len());
        }

        info!(
            "Coalescer stopped after {} flushes ({} events, {} uploads)",
            stats.flushes, stats.events, stats.uploads
        );
        stats
    }

    /// Upload every written path in `pending`, one at a time.
    ///
    /// A failed upload does not stop the remaining ones.
    pub async fn flush(&self, pending: PendingSet) -> FlushReport {
        let mut report = FlushReport {
            pending: pending.len(),
            ..Default::default()
        };

        let paths: Vec<PathBuf> = pending.into_write_paths();
        for path in paths {
            let outcome = self.uploader.upload(&path).await;
            report.uploads += 1;
            if outcome.is_success() {
                report.succeeded += 1;
            }
        }

        if report.uploads > 0 {
            debug!(
                "Flushed {} pending change(s): {}/{} uploads succeeded",
                report.pending, report.succeeded, report.uploads
            );
        }

        report
    }
}

/// Result of a single flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Distinct identities that were pending.
    pub pending: usize,

    /// Uploads attempted.
    pub uploads: usize,

    /// Uploads the remote accepted.
    pub succeeded: usize,
}

/// Counters for a whole coalescer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Window ticks processed.
    pub flushes: usize,

    /// Events received.
    pub events: usize,

    /// Uploads attempted.
    pub uploads: usize,
}
