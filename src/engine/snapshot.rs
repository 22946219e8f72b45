//! Persisted index snapshot: one JSON array of [`EntryRecord`] at a fixed path.
//!
//! Writes go to `<file>.tmp` in the same directory and are renamed over the target, so a reader
//! sees either the previous snapshot or the new one, never a partial file. All failures are
//! logged through the injected [`IndexLogger`] and never returned to the caller.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::EntryRecord;
use crate::utils::logger::IndexLogger;
use crate::utils::tempfiles::{remove_stale_temp, temp_path_for};

/// Best-effort JSON persistence for the catalog.
pub struct SnapshotStore {
    path: PathBuf,
    logger: Arc<dyn IndexLogger>,
    /// Serializes writers: the walker's periodic save and an explicit stop may overlap.
    write_lock: Mutex<()>,
    /// Catalog count at the last successful save or load. Shared across roots and walks.
    last_saved_count: AtomicUsize,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, logger: Arc<dyn IndexLogger>) -> Self {
        Self {
            path: path.into(),
            logger,
            write_lock: Mutex::new(()),
            last_saved_count: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_saved_count(&self) -> usize {
        self.last_saved_count.load(Ordering::Relaxed)
    }

    pub fn set_last_saved_count(&self, count: usize) {
        self.last_saved_count.store(count, Ordering::Relaxed);
    }

    /// True once `count` is at least `batch` entries past the last save.
    pub fn save_due(&self, count: usize, batch: usize) -> bool {
        count.saturating_sub(self.last_saved_count()) >= batch
    }

    /// Write `entries` atomically. Returns whether the write succeeded; failures are logged.
    pub fn save(&self, entries: &[EntryRecord]) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_locked(entries)
    }

    /// Like [`SnapshotStore::save`], but takes the entries only once the write lock is held,
    /// so the last writer always persists the newest catalog.
    pub fn save_with<F>(&self, entries: F) -> bool
    where
        F: FnOnce() -> Vec<EntryRecord>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_locked(&entries())
    }

    fn write_locked(&self, entries: &[EntryRecord]) -> bool {
        match write_snapshot(&self.path, entries) {
            Ok(()) => {
                self.set_last_saved_count(entries.len());
                self.logger
                    .log(&format!("Saved index to disk: {} entries", entries.len()));
                true
            }
            Err(e) => {
                self.logger.log_error(&e);
                false
            }
        }
    }

    /// Read the snapshot. A missing file is an empty index; a corrupt one is logged and
    /// treated as empty.
    pub fn load(&self) -> Vec<EntryRecord> {
        if !self.path.exists() {
            return Vec::new();
        }
        self.logger.log("Loading persisted index from disk...");
        match read_snapshot(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                self.logger.log_error(&e);
                Vec::new()
            }
        }
    }
}

/// Serialize to the sibling temp file, fsync, then rename over `path`.
pub fn write_snapshot(path: &Path, entries: &[EntryRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create index directory {}", parent.display()))?;
    }
    let temp = temp_path_for(path);
    let result = (|| -> Result<()> {
        let file = File::create(&temp)
            .with_context(|| format!("create temp index {}", temp.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, entries).context("serialize index")?;
        writer.flush().context("flush temp index")?;
        writer
            .get_ref()
            .sync_all()
            .context("sync temp index")?;
        drop(writer);
        fs::rename(&temp, path).context("atomic rename temp index to final path")?;
        Ok(())
    })();
    remove_stale_temp(&temp);
    result
}

/// Deserialize a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Vec<EntryRecord>> {
    let file = File::open(path).with_context(|| format!("open index {}", path.display()))?;
    let entries: Vec<EntryRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("deserialize index {}", path.display()))?;
    Ok(entries)
}
