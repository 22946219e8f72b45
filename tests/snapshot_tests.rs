//! Snapshot tests: atomic save, load round-trip, corrupt and missing files.

use chrono::{DateTime, Utc};
use filedex::engine::{SnapshotStore, read_snapshot, write_snapshot};
use filedex::{EntryRecord, IndexLogger};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemLogger {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl IndexLogger for MemLogger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
    fn log_error(&self, error: &anyhow::Error) {
        self.errors.lock().unwrap().push(format!("{:#}", error));
    }
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn records() -> Vec<EntryRecord> {
    vec![
        EntryRecord::new("/data/a.txt", 10, at("2024-01-02T03:04:05Z"), false),
        EntryRecord::new("/data/sub/b.txt", 20, at("2023-12-31T23:59:59.5Z"), false),
        EntryRecord::new("/data/sub", 0, at("2023-06-01T00:00:00Z"), true),
    ]
}

fn paths(entries: &[EntryRecord]) -> HashSet<PathBuf> {
    entries.iter().map(|e| e.path.clone()).collect()
}

#[test]
fn test_save_creates_parent_and_leaves_no_temp() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("index.json");
    let logger = Arc::new(MemLogger::default());
    let store = SnapshotStore::new(&target, logger.clone());

    assert!(store.save(&records()));
    assert!(target.exists());
    assert!(!dir.path().join("nested").join("index.json.tmp").exists());
    assert_eq!(store.last_saved_count(), 3);
    assert!(logger.errors.lock().unwrap().is_empty());
}

#[test]
fn test_snapshot_json_layout() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("index.json");
    write_snapshot(&target, &records()[..1]).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["path"], "/data/a.txt");
    assert_eq!(first["sizeBytes"], 10);
    assert_eq!(first["modifiedAt"], "2024-01-02T03:04:05Z");
    assert_eq!(first["isDirectory"], false);
}

#[test]
fn test_load_save_load_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("index.json");
    write_snapshot(&target, &records()).unwrap();

    let store = SnapshotStore::new(&target, Arc::new(MemLogger::default()));
    let first = store.load();
    assert!(store.save(&first));
    let second = store.load();
    assert_eq!(paths(&first), paths(&second));
    assert_eq!(first, second);
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("index.json");
    write_snapshot(&target, &records()).unwrap();
    write_snapshot(&target, &records()[..1]).unwrap();
    assert_eq!(read_snapshot(&target).unwrap().len(), 1);
}

#[test]
fn test_missing_file_loads_empty_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(MemLogger::default());
    let store = SnapshotStore::new(dir.path().join("absent.json"), logger.clone());
    assert!(store.load().is_empty());
    assert!(logger.errors.lock().unwrap().is_empty());
}

#[test]
fn test_corrupt_file_loads_empty_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("index.json");
    std::fs::write(&target, b"[{\"path\": \"/trunc").unwrap();
    let logger = Arc::new(MemLogger::default());
    let store = SnapshotStore::new(&target, logger.clone());
    assert!(store.load().is_empty());
    let errors = logger.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("deserialize index"));
}

#[test]
fn test_unwritable_target_is_logged_not_thrown() {
    let dir = tempfile::tempdir().unwrap();
    // The target's parent is a regular file, so the directory cannot be created.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let logger = Arc::new(MemLogger::default());
    let store = SnapshotStore::new(blocker.join("index.json"), logger.clone());
    assert!(!store.save(&records()));
    assert_eq!(logger.errors.lock().unwrap().len(), 1);
    assert_eq!(store.last_saved_count(), 0);
}

#[test]
fn test_save_due_uses_global_counter() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("i.json"), Arc::new(MemLogger::default()));
    assert!(!store.save_due(4999, 5000));
    assert!(store.save_due(5000, 5000));
    store.set_last_saved_count(5000);
    assert!(!store.save_due(9999, 5000));
    assert!(store.save_due(10_000, 5000));
}
