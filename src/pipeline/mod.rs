//! Traversal engine: walk context, the walk loop, error classification.

pub mod context;
pub mod error_handler;
pub mod walk;

pub use context::{WalkContext, WalkEvent, WalkSummary, dedupe_roots};
pub use error_handler::{WalkErrorClass, classify_walk_error, report_skipped_paths};
pub use walk::walk_roots;
