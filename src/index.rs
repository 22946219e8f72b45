//! Indexing coordinator: walk lifecycle, batching toward the sink, periodic and final saves.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::debug;

use crate::catalog::CatalogStore;
use crate::engine::query::search_entries;
use crate::engine::snapshot::SnapshotStore;
use crate::notify::{IndexObserver, Notifier, NullSink, ResultSink};
use crate::pipeline::{WalkContext, WalkEvent, report_skipped_paths, walk_roots};
use crate::utils::config::IndexerConfig;
use crate::utils::drives::ready_drive_roots;
use crate::utils::logger::{IndexLogger, LogFacade};
use crate::{EntryRecord, IndexState};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the caller-facing [`Indexer`] and its walk thread.
struct Shared {
    config: IndexerConfig,
    catalog: CatalogStore,
    store: SnapshotStore,
    notifier: Notifier,
    logger: Arc<dyn IndexLogger>,
    state: Mutex<IndexState>,
    last_error: Mutex<Option<String>>,
}

impl Shared {
    // State changes are posted under the state lock so observers see them in the same order.
    fn set_state(&self, state: IndexState) {
        let mut current = lock(&self.state);
        *current = state;
        self.notifier.state_changed(state);
    }

    /// Move `from -> to` only if the current state is `from`.
    fn transition(&self, from: IndexState, to: IndexState) -> bool {
        let mut current = lock(&self.state);
        if *current != from {
            return false;
        }
        *current = to;
        self.notifier.state_changed(to);
        true
    }

    fn report_error(&self, error: anyhow::Error) {
        let message = format!("{:#}", error);
        *lock(&self.last_error) = Some(message.clone());
        self.notifier.error(message);
        self.logger.log_error(&error);
    }

    fn save_catalog(&self) -> bool {
        self.store.save_with(|| self.catalog.snapshot())
    }
}

/// Apply one walker event: catalog append, sink batching, progress cadence, periodic save.
fn handle_walk_event(shared: &Shared, pending: &mut Vec<EntryRecord>, event: WalkEvent) {
    let cfg = &shared.config;
    match event {
        WalkEvent::Record(record) => {
            pending.push(record.clone());
            let count = shared.catalog.add(record);
            if pending.len() >= cfg.walk_batch_size {
                shared.notifier.append(mem::take(pending));
            }
            if count.is_multiple_of(cfg.progress_stride) {
                shared.notifier.progress(count);
                debug!("Indexed count: {}", count);
            }
            if shared.store.save_due(count, cfg.save_batch_size) {
                shared.save_catalog();
            }
        }
        WalkEvent::DirectoryBoundary => {
            if !pending.is_empty() {
                shared.notifier.append(mem::take(pending));
            }
        }
        WalkEvent::Error(e) => shared.report_error(e),
    }
}

/// Walk body run on the background thread.
fn run_walk(shared: Arc<Shared>, ctx: WalkContext) {
    let mut pending: Vec<EntryRecord> = Vec::with_capacity(shared.config.walk_batch_size);
    let summary = walk_roots(&ctx, |event| handle_walk_event(&shared, &mut pending, event));
    shared.notifier.append(pending);
    report_skipped_paths(&summary);

    shared.set_state(IndexState::Idle);
    shared.logger.log(&format!(
        "Indexing {}: {} entries, {} skipped, {} ignored",
        if summary.cancelled { "cancelled" } else { "finished" },
        summary.added,
        summary.skipped.len(),
        summary.ignored
    ));
    shared.save_catalog();
}

/// Builder for [`Indexer`]: attach the sink, observers and logger before the dispatcher starts.
pub struct IndexerBuilder {
    config: IndexerConfig,
    sink: Option<Box<dyn ResultSink>>,
    observers: Vec<Box<dyn IndexObserver>>,
    logger: Option<Arc<dyn IndexLogger>>,
}

impl IndexerBuilder {
    pub fn with_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_observer(mut self, observer: impl IndexObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn IndexLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Indexer {
        let config = self.config.normalized();
        let logger = self.logger.unwrap_or_else(|| Arc::new(LogFacade));
        let sink = self.sink.unwrap_or_else(|| Box::new(NullSink));
        let notifier = Notifier::spawn(sink, self.observers);
        let store = SnapshotStore::new(config.index_file(), Arc::clone(&logger));
        Indexer {
            shared: Arc::new(Shared {
                config,
                catalog: CatalogStore::new(),
                store,
                notifier,
                logger,
                state: Mutex::new(IndexState::Idle),
                last_error: Mutex::new(None),
            }),
            cancel: Mutex::new(Arc::new(AtomicBool::new(false))),
            worker: Mutex::new(None),
        }
    }
}

/// The indexing coordinator.
///
/// One walk runs at a time on a dedicated thread. The catalog is readable at any point
/// (queries work on a copy), and every sink or observer update goes through the
/// [`Notifier`] dispatcher, off the walking thread. No operation returns an error: failures
/// reach the [`IndexLogger`] and [`IndexObserver::on_error`].
pub struct Indexer {
    shared: Arc<Shared>,
    /// Cancel flag of the current (or last) walk.
    cancel: Mutex<Arc<AtomicBool>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Indexer {
    pub fn builder(config: IndexerConfig) -> IndexerBuilder {
        IndexerBuilder {
            config,
            sink: None,
            observers: Vec::new(),
            logger: None,
        }
    }

    /// Indexer with the default logger and no observers.
    pub fn new(config: IndexerConfig, sink: impl ResultSink + 'static) -> Self {
        Self::builder(config).with_sink(sink).build()
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.shared.config
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.shared.catalog
    }

    pub fn index_file(&self) -> &Path {
        self.shared.store.path()
    }

    pub fn state(&self) -> IndexState {
        *lock(&self.shared.state)
    }

    pub fn is_indexing(&self) -> bool {
        self.state().is_indexing()
    }

    pub fn indexed_count(&self) -> usize {
        self.shared.catalog.count()
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared.last_error).clone()
    }

    /// Replace the catalog with the persisted snapshot, feeding catalog and sink in batches.
    /// Skipped while a walk thread is alive, including a stopped walk that has not exited yet.
    /// Returns the number of entries loaded.
    pub fn load_persisted(&self) -> usize {
        let shared = &self.shared;
        // Held for the whole load so no walk can start underneath it.
        let mut worker = lock(&self.worker);
        if worker.as_ref().is_some_and(|h| !h.is_finished()) {
            shared.logger.log("Skipped loading persisted index: indexing in progress");
            return 0;
        }
        if let Some(finished) = worker.take() {
            let _ = finished.join();
        }
        let entries = shared.store.load();
        shared.catalog.clear();
        shared.notifier.clear();
        for chunk in entries.chunks(shared.config.load_batch_size) {
            shared.catalog.extend(chunk);
            shared.notifier.append(chunk.to_vec());
            thread::yield_now();
        }
        let count = shared.catalog.count();
        shared.store.set_last_saved_count(count);
        shared.logger.log(&format!("Loaded persisted index: {} entries", count));
        shared.notifier.progress(count);
        entries.len()
    }

    /// Start a fresh walk over `roots`. A running walk is cancelled, saved and joined first.
    pub fn start_indexing(&self, roots: Vec<PathBuf>) {
        let mut worker = lock(&self.worker);
        if let Some(previous) = worker.take() {
            self.stop_indexing();
            let _ = previous.join();
        }

        let shared = &self.shared;
        shared.catalog.clear();
        shared.store.set_last_saved_count(0);
        shared.notifier.clear();

        let cancel = Arc::new(AtomicBool::new(false));
        *lock(&self.cancel) = Arc::clone(&cancel);
        let ctx = WalkContext::new(&shared.config, roots, cancel, Arc::clone(&shared.logger));
        shared.set_state(IndexState::Indexing);
        shared.logger.log("Indexing started");

        let walk_shared = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name(format!("{}-walk", env!("CARGO_PKG_NAME")))
            .spawn(move || run_walk(walk_shared, ctx));
        match spawned {
            Ok(handle) => *worker = Some(handle),
            Err(e) => {
                shared.report_error(anyhow::Error::new(e).context("spawn walk thread"));
                shared.set_state(IndexState::Idle);
            }
        }
    }

    /// Walk the configured roots, or every ready drive when none are configured.
    pub fn refresh(&self) {
        let roots = if self.shared.config.roots.is_empty() {
            ready_drive_roots()
        } else {
            self.shared.config.roots.clone()
        };
        self.start_indexing(roots);
    }

    /// Signal the running walk to stop and save the catalog now. Does not wait for the walk
    /// thread; use [`Indexer::wait`] for that.
    pub fn stop_indexing(&self) {
        lock(&self.cancel).store(true, Ordering::Relaxed);
        self.shared.transition(IndexState::Indexing, IndexState::Stopped);
        self.shared.save_catalog();
    }

    /// Block until the current walk (if any) has finished, including its final save.
    pub fn wait(&self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            self.shared.report_error(anyhow::anyhow!("walk thread panicked"));
            self.shared.set_state(IndexState::Idle);
        }
    }

    /// Filter the catalog by `query` and republish the result to the sink (clear, then
    /// batches). Returns the match count. On failure the sink is left untouched.
    pub fn search(&self, query: &str) -> usize {
        self.search_with(query, search_entries)
    }

    fn search_with<F>(&self, query: &str, filter: F) -> usize
    where
        F: FnOnce(&[EntryRecord], &str) -> Vec<EntryRecord>,
    {
        let entries = self.shared.catalog.snapshot();
        match panic::catch_unwind(AssertUnwindSafe(|| filter(&entries, query))) {
            Ok(matches) => {
                let batch = self.shared.config.ui_batch_size;
                self.shared.notifier.replace(&matches, batch);
                matches.len()
            }
            Err(_) => {
                self.shared.report_error(anyhow::anyhow!("search for {:?} failed", query));
                0
            }
        }
    }

    /// Save the current catalog immediately. Returns whether the write succeeded.
    pub fn save_now(&self) -> bool {
        self.shared.save_catalog()
    }

    /// Wait until every notification posted so far has reached the sink and observers.
    pub fn flush(&self) {
        self.shared.notifier.flush();
    }
}

impl Drop for Indexer {
    fn drop(&mut self) {
        lock(&self.cancel).store(true, Ordering::Relaxed);
        if let Some(handle) = lock(&self.worker).take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ResultBuffer;
    use chrono::Utc;

    #[derive(Clone, Default)]
    struct Errors(Arc<Mutex<Vec<String>>>);

    impl IndexObserver for Errors {
        fn on_error(&mut self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn indexer(dir: &Path) -> (Indexer, ResultBuffer, Errors) {
        let config = IndexerConfig {
            index_file: Some(dir.join("index.json")),
            ..Default::default()
        };
        let results = ResultBuffer::new();
        let errors = Errors::default();
        let indexer = Indexer::builder(config)
            .with_sink(results.clone())
            .with_observer(errors.clone())
            .build();
        (indexer, results, errors)
    }

    #[test]
    fn walk_error_sets_last_error_and_reaches_observers() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, _results, errors) = indexer(dir.path());
        let mut pending = Vec::new();

        let err = anyhow::anyhow!("filesystem loop").context("walk error at /data/loop");
        handle_walk_event(&indexer.shared, &mut pending, WalkEvent::Error(err));
        indexer.flush();

        let last = indexer.last_error().unwrap();
        assert!(last.starts_with("walk error at /data/loop"));
        assert!(last.contains("filesystem loop"));
        assert_eq!(*errors.0.lock().unwrap(), vec![last]);
        assert!(pending.is_empty());
        assert_eq!(indexer.indexed_count(), 0);
    }

    #[test]
    fn record_events_batch_toward_sink() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, results, _errors) = indexer(dir.path());
        let mut pending = Vec::new();

        let record = EntryRecord::new("/data/a.txt", 1, Utc::now(), false);
        handle_walk_event(&indexer.shared, &mut pending, WalkEvent::Record(record.clone()));
        assert_eq!(pending, vec![record.clone()]);
        handle_walk_event(&indexer.shared, &mut pending, WalkEvent::DirectoryBoundary);
        indexer.flush();

        assert!(pending.is_empty());
        assert_eq!(results.entries(), vec![record]);
        assert_eq!(indexer.indexed_count(), 1);
    }

    #[test]
    fn failed_query_reports_error_and_keeps_sink() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, results, errors) = indexer(dir.path());
        indexer
            .shared
            .catalog
            .add(EntryRecord::new("/data/a.txt", 1, Utc::now(), false));
        assert_eq!(indexer.search("a"), 1);
        indexer.flush();
        let before = results.entries();

        let hits = indexer.search_with("a", |_, _| panic!("filter blew up"));
        indexer.flush();

        assert_eq!(hits, 0);
        assert_eq!(results.entries(), before);
        let last = indexer.last_error().unwrap();
        assert!(last.contains("search for \"a\" failed"));
        assert_eq!(*errors.0.lock().unwrap(), vec![last]);
    }
}
