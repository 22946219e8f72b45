//! Walk context: everything the walker needs for one run, plus its summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::EntryRecord;
use crate::utils::config::{IndexerConfig, PackagePaths};
use crate::utils::logger::IndexLogger;
use crate::utils::tempfiles::temp_path_for;

/// Shared, read-only input for one walk. Built by the coordinator and moved into the worker.
pub struct WalkContext {
    pub roots: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub protected_dir_names: Vec<String>,
    pub index_directories: bool,
    pub skip_os_hidden: bool,
    /// The indexer's own snapshot, its temp sibling and the log file. Never recorded.
    pub own_files: Vec<PathBuf>,
    pub cancel: Arc<AtomicBool>,
    pub logger: Arc<dyn IndexLogger>,
}

impl WalkContext {
    pub fn new(
        config: &IndexerConfig,
        roots: Vec<PathBuf>,
        cancel: Arc<AtomicBool>,
        logger: Arc<dyn IndexLogger>,
    ) -> Self {
        Self {
            roots: dedupe_roots(roots),
            exclude: config.exclude.clone(),
            protected_dir_names: config.protected_dir_names.clone(),
            index_directories: config.index_directories,
            skip_os_hidden: config.skip_os_hidden,
            own_files: own_files(config),
            cancel,
            logger,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn is_own_file(&self, path: &Path) -> bool {
        self.own_files.iter().any(|f| f == path)
    }
}

/// Canonical parent joined with the file name, so the file need not exist yet.
fn canonical_file_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

fn own_files(config: &IndexerConfig) -> Vec<PathBuf> {
    let index_file = config.index_file();
    let temp = temp_path_for(&index_file);
    [index_file, temp, PackagePaths::get().default_log_file()]
        .into_iter()
        .map(|p| canonical_file_path(&p))
        .collect()
}

/// Drop duplicate roots and roots nested under another root, keeping first-seen order,
/// so no path is discovered twice within one walk.
pub fn dedupe_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let normalized: Vec<PathBuf> = roots
        .into_iter()
        .map(|r| r.canonicalize().unwrap_or(r))
        .collect();
    let mut kept: Vec<PathBuf> = Vec::with_capacity(normalized.len());
    for (i, root) in normalized.iter().enumerate() {
        let nested = normalized
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other != root && root.starts_with(other));
        if !nested && !kept.contains(root) {
            kept.push(root.clone());
        }
    }
    kept
}

/// One item produced by the walker for its consumer.
#[derive(Debug)]
pub enum WalkEvent {
    /// A newly discovered entry, in pre-order.
    Record(EntryRecord),
    /// A new directory listing is about to start; buffered records can be flushed.
    DirectoryBoundary,
    /// An error outside the expected filesystem taxonomy. The walk continues.
    Error(anyhow::Error),
}

/// Outcome of one walk over all roots.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Records emitted.
    pub added: usize,
    /// Paths skipped because of expected filesystem errors, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Entries dropped by the skip policy (system, reparse, protected, excluded).
    pub ignored: usize,
    pub unexpected_errors: usize,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_files_include_snapshot_temp_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let config = IndexerConfig {
            index_file: Some(base.join("index.json")),
            ..Default::default()
        };
        let files = own_files(&config);
        assert_eq!(files[0], base.join("index.json"));
        assert_eq!(files[1], base.join("index.json.tmp"));
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn nested_roots_collapse_to_outer() {
        let roots = vec![
            PathBuf::from("/nonexistent-filedex/a/b"),
            PathBuf::from("/nonexistent-filedex/a"),
            PathBuf::from("/nonexistent-filedex/c"),
            PathBuf::from("/nonexistent-filedex/c"),
        ];
        assert_eq!(
            dedupe_roots(roots),
            vec![
                PathBuf::from("/nonexistent-filedex/a"),
                PathBuf::from("/nonexistent-filedex/c"),
            ]
        );
    }
}
