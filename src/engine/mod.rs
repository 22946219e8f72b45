//! Engine module: persistence, query, walk policy and the CLI front end

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod query;
pub mod snapshot;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, CommonArgs};
pub use cli::handle_run;
pub use query::{matches_all, search_entries, tokenize};
pub use snapshot::{SnapshotStore, read_snapshot, write_snapshot};
pub use tools::{
    SkipReason, attribute_skip_reason, glob_match, is_excluded, is_os_hidden_file,
    is_protected_name,
};
