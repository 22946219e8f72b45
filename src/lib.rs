//! filedex: file-system indexing and search engine for a desktop shell.
//!
//! A background walk fills an in-memory [`CatalogStore`](catalog::CatalogStore) with
//! [`EntryRecord`]s, the catalog is persisted as JSON through
//! [`SnapshotStore`](engine::snapshot::SnapshotStore), and name queries run against a
//! point-in-time copy while the walk may still be going. [`Indexer`] ties these together:
//!
//! ```ignore
//! let results = filedex::ResultBuffer::new();
//! let indexer = filedex::Indexer::new(filedex::IndexerConfig::default(), results.clone());
//! indexer.start_indexing(vec!["/data".into()]);
//! indexer.wait();
//! indexer.search("report 2024");
//! indexer.flush();
//! for e in results.entries() { println!("{}", e.path.display()); }
//! ```

pub mod catalog;
pub mod engine;
pub mod index;
pub mod notify;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use catalog::CatalogStore;
pub use index::{Indexer, IndexerBuilder};
pub use notify::{IndexObserver, NullSink, ResultBuffer, ResultSink};
pub use utils::config::IndexerConfig;
pub use utils::logger::{FileLogger, IndexLogger, LogFacade};

/// Result alias used by public filedex API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
