//! Result sink and observer boundary.
//!
//! The coordinator never calls collaborator code on the walking thread. Every update is posted
//! to an unbounded channel and delivered, in order, by one dispatcher thread that owns the sink
//! and observers. A slow sink delays only the dispatcher.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::{EntryRecord, IndexState};

/// Consumer of entry batches (a result list in a UI, a terminal printer, ...).
///
/// Called from the dispatcher thread, never from the caller's thread; implementations that
/// need thread affinity marshal themselves.
pub trait ResultSink: Send {
    fn clear(&mut self);
    fn append(&mut self, batch: Vec<EntryRecord>);
}

/// Status subscriber. All methods default to no-ops.
pub trait IndexObserver: Send {
    fn on_progress(&mut self, _count: usize) {}
    fn on_state_changed(&mut self, _state: IndexState) {}
    fn on_error(&mut self, _message: &str) {}
}

enum Notification {
    Clear,
    Append(Vec<EntryRecord>),
    Progress(usize),
    State(IndexState),
    Error(String),
    Barrier(Sender<()>),
}

/// Handle used by the coordinator to post notifications. Cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    /// Spawn the dispatcher thread. It exits when every `Notifier` clone is dropped.
    pub fn spawn(sink: Box<dyn ResultSink>, observers: Vec<Box<dyn IndexObserver>>) -> Self {
        let (tx, rx) = unbounded::<Notification>();
        thread::Builder::new()
            .name(format!("{}-notify", env!("CARGO_PKG_NAME")))
            .spawn(move || dispatch_loop(rx, sink, observers))
            .map(|_| ())
            .unwrap_or_else(|e| log::error!("spawn notification thread: {}", e));
        Self { tx }
    }

    fn post(&self, n: Notification) {
        // Send only fails when the dispatcher is gone; nothing left to notify.
        let _ = self.tx.send(n);
    }

    pub fn clear(&self) {
        self.post(Notification::Clear);
    }

    pub fn append(&self, batch: Vec<EntryRecord>) {
        if !batch.is_empty() {
            self.post(Notification::Append(batch));
        }
    }

    /// Clear the sink, then append `entries` in chunks of `batch_size`.
    pub fn replace(&self, entries: &[EntryRecord], batch_size: usize) {
        self.clear();
        for chunk in entries.chunks(batch_size.max(1)) {
            self.append(chunk.to_vec());
        }
    }

    pub fn progress(&self, count: usize) {
        self.post(Notification::Progress(count));
    }

    pub fn state_changed(&self, state: IndexState) {
        self.post(Notification::State(state));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(Notification::Error(message.into()));
    }

    /// Block until every notification posted before this call has been delivered.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded::<()>(1);
        if self.tx.send(Notification::Barrier(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

fn dispatch_loop(
    rx: Receiver<Notification>,
    mut sink: Box<dyn ResultSink>,
    mut observers: Vec<Box<dyn IndexObserver>>,
) {
    while let Ok(n) = rx.recv() {
        match n {
            Notification::Clear => sink.clear(),
            Notification::Append(batch) => sink.append(batch),
            Notification::Progress(count) => {
                observers.iter_mut().for_each(|o| o.on_progress(count))
            }
            Notification::State(state) => {
                observers.iter_mut().for_each(|o| o.on_state_changed(state))
            }
            Notification::Error(msg) => observers.iter_mut().for_each(|o| o.on_error(&msg)),
            Notification::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Sink that discards everything (CLI runs that only persist).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn clear(&mut self) {}
    fn append(&mut self, _batch: Vec<EntryRecord>) {}
}

/// Cloneable sink that keeps the current view in memory, for hosts that poll.
#[derive(Clone, Debug, Default)]
pub struct ResultBuffer {
    inner: Arc<Mutex<Vec<EntryRecord>>>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current view.
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for ResultBuffer {
    fn clear(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn append(&mut self, batch: Vec<EntryRecord>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch);
    }
}
