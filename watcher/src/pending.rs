//! Pending changes for the current coalescing window.

use std::collections::HashMap;
use std::mem;
use std::path::PathBuf;

use crate::event::{ChangeEvent, EventIdentity};

/// Changes seen during one window, keyed by identity.
///
/// Holds at most one event per identity; a newer event replaces the older one.
#[derive(Debug, Default)]
pub struct PendingSet {
    events: HashMap<EventIdentity, ChangeEvent>,
}

impl PendingSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, replacing any earlier event with the same identity.
    pub fn insert(&mut self, event: ChangeEvent) {
        self.events.insert(event.identity(), event);
    }

    /// Number of distinct identities pending.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every pending event, leaving an empty set behind.
    pub fn take(&mut self) -> PendingSet {
        mem::take(self)
    }

    /// Paths that were written, one per identity.
    ///
    /// All other kinds of change are dropped.
    pub fn into_write_paths(self) -> Vec<PathBuf> {
        self.events
            .into_values()
            .filter(ChangeEvent::is_write)
            .map(|event| event.path)
            .collect()
    }
}
