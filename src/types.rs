//! Public types shared by the catalog, walker, query engine and coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata for one indexed filesystem object. Identity is the absolute path.
///
/// Serialized as one element of the persisted snapshot array:
/// `{"path": "...", "sizeBytes": 10, "modifiedAt": "2024-01-01T00:00:00Z", "isDirectory": false}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub is_directory: bool,
}

impl EntryRecord {
    pub fn new(
        path: impl Into<PathBuf>,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
        is_directory: bool,
    ) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            modified_at,
            is_directory,
        }
    }

    /// Build a record from filesystem metadata. Directories are recorded with size 0.
    /// A missing or unsupported mtime falls back to the Unix epoch.
    pub fn from_metadata(path: &Path, meta: &std::fs::Metadata) -> Self {
        let modified_at = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| DateTime::<Utc>::from(SystemTime::UNIX_EPOCH));
        let is_directory = meta.is_dir();
        Self {
            path: path.to_path_buf(),
            size_bytes: if is_directory { 0 } else { meta.len() },
            modified_at,
            is_directory,
        }
    }

    /// Final path component, the only part the query engine matches against.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Coordinator lifecycle: `Idle -> Indexing -> Idle`, with `Stopped` entered on explicit cancel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexState {
    #[default]
    Idle,
    Indexing,
    Stopped,
}

impl IndexState {
    pub fn is_indexing(&self) -> bool {
        matches!(self, IndexState::Indexing)
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexState::Idle => "idle",
            IndexState::Indexing => "indexing",
            IndexState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
