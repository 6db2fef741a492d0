//! # Directory Watcher
//!
//! This crate watches a single directory and turns its change notifications
//! into uploads, at most one per written file per coalescing window.
//!
//! ## Features
//!
//! - **Flat Watching**: Monitor one directory level for changes
//! - **Event Coalescing**: Merge duplicate notifications within a fixed window
//! - **Write Filtering**: Only content writes trigger an upload
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Watcher                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ChangeSource ──► ChangeStreams ──► Coalescer ──► Uploader     │
//! │       │                                 │                       │
//! │       ▼                                 ▼                       │
//! │  ChangeEvent                       PendingSet                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod coalescer;
pub mod error;
pub mod event;
pub mod pending;
pub mod source;

pub use coalescer::{Coalescer, CoalescerStats, DEFAULT_WINDOW, FlushReport};
pub use error::{Result, WatcherError};
pub use event::{ChangeEvent, ChangeKind, EventIdentity};
pub use pending::PendingSet;
pub use source::{ChangeFeed, ChangeSource, ChangeStreams};
