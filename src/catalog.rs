//! In-memory catalog: the authoritative, discovery-ordered list of indexed entries.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::EntryRecord;

/// Lock-protected list of [`EntryRecord`]s. Callers never see the inner `Vec`; reads go
/// through [`CatalogStore::snapshot`], which copies under the lock and releases it before
/// returning.
#[derive(Debug, Default)]
pub struct CatalogStore {
    entries: Mutex<Vec<EntryRecord>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<EntryRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one record and return the new count.
    pub fn add(&self, record: EntryRecord) -> usize {
        let mut entries = self.guard();
        entries.push(record);
        entries.len()
    }

    /// Append a batch (snapshot load) and return the new count.
    pub fn extend(&self, batch: &[EntryRecord]) -> usize {
        let mut entries = self.guard();
        entries.extend_from_slice(batch);
        entries.len()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn count(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Point-in-time copy of every record, in insertion order.
    pub fn snapshot(&self) -> Vec<EntryRecord> {
        self.guard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    fn rec(p: &str) -> EntryRecord {
        EntryRecord::new(p, 1, Utc::now(), false)
    }

    #[test]
    fn add_returns_running_count() {
        let c = CatalogStore::new();
        assert_eq!(c.add(rec("/a")), 1);
        assert_eq!(c.add(rec("/b")), 2);
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let c = CatalogStore::new();
        c.add(rec("/a"));
        let snap = c.snapshot();
        c.add(rec("/b"));
        assert_eq!(snap.len(), 1);
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn clear_empties_store() {
        let c = CatalogStore::new();
        c.extend(&[rec("/a"), rec("/b")]);
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn concurrent_add_and_snapshot() {
        let c = Arc::new(CatalogStore::new());
        let writer = {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                for i in 0..1000 {
                    c.add(rec(&format!("/f{i}")));
                }
            })
        };
        for _ in 0..50 {
            let snap = c.snapshot();
            assert!(snap.len() <= 1000);
        }
        writer.join().unwrap();
        assert_eq!(c.count(), 1000);
    }
}
