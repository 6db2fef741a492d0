//! Change events from directory watching.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use notify::event::{EventKind, ModifyKind};

/// A single change to a path in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path to the affected file or directory.
    pub path: PathBuf,

    /// The kind of change.
    pub kind: ChangeKind,

    /// When the event was observed.
    pub observed_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new change event observed now.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind,
            observed_at: Utc::now(),
        }
    }

    /// Deduplication key for this event.
    pub fn identity(&self) -> EventIdentity {
        EventIdentity {
            path: self.path.clone(),
            kind: self.kind,
        }
    }

    /// Whether this event changed the file's content.
    pub fn is_write(&self) -> bool {
        self.kind == ChangeKind::Write
    }

    /// Split a notify event into one change event per affected path.
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let kind = ChangeKind::from(event.kind);
        event
            .paths
            .into_iter()
            .map(|path| Self::new(kind, path))
            .collect()
    }
}

/// Kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// File was created.
    Create,

    /// File content was written.
    Write,

    /// File was removed.
    Remove,

    /// File was renamed.
    Rename,

    /// File metadata changed.
    Chmod,

    /// Anything else (access, unknown).
    Other,
}

impl ChangeKind {
    /// Upper-case name used in identities and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Chmod => "CHMOD",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventKind> for ChangeKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Self::Create,
            EventKind::Modify(modify_kind) => match modify_kind {
                ModifyKind::Data(_) | ModifyKind::Any => Self::Write,
                ModifyKind::Name(_) => Self::Rename,
                ModifyKind::Metadata(_) => Self::Chmod,
                _ => Self::Other,
            },
            EventKind::Remove(_) => Self::Remove,
            _ => Self::Other,
        }
    }
}

/// Deduplication key: the changed path plus the kind of change.
///
/// Renders as `"<path>": <KIND>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentity {
    /// Changed path.
    pub path: PathBuf,

    /// Kind of change.
    pub kind: ChangeKind,
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path.display().to_string(), self.kind)
    }
}
