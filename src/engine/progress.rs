//! Terminal progress display fed by indexer notifications.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::IndexState;
use crate::notify::IndexObserver;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Move the counter to `n`.
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn set_counter(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update_to(n);
    }
}

/// Force a refresh of the bar (e.g. so counter shows "0 files" immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Observer that drives a kdam counter from progress notifications and prints errors
/// below it.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(desc: &'static str) -> Self {
        let bar = create_counter(desc);
        refresh_bar(&bar);
        Self { bar }
    }
}

impl IndexObserver for ProgressObserver {
    fn on_progress(&mut self, count: usize) {
        set_counter(&self.bar, count);
    }

    fn on_state_changed(&mut self, state: IndexState) {
        if !state.is_indexing() {
            refresh_bar(&self.bar);
        }
    }

    fn on_error(&mut self, message: &str) {
        if let Ok(mut bar) = self.bar.try_lock() {
            let _ = bar.write(format!("error: {}", message));
        }
    }
}
