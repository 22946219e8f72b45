use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Desktop file indexer: walk local storage into a persisted catalog and search it by name.
#[derive(Clone, Parser)]
#[command(name = "filedex")]
#[command(about = "Index local storage and search file names.")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Args)]
pub struct CommonArgs {
    /// Config file. Default: `filedex.toml` in the application data directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Index snapshot path. Default: `index.json` in the application data directory.
    #[arg(long, short = 'i', global = true)]
    pub index_file: Option<PathBuf>,

    /// Verbose output (debug logs, live counter).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Walk ROOTS (or the configured roots / all ready drives) and persist the catalog.
    Index {
        /// Roots to index. Default: `roots` from config, else all ready drives.
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,

        /// Ignore configured roots and walk every ready drive.
        #[arg(long, conflicts_with = "roots")]
        all_drives: bool,

        /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2
        #[arg(long, short = 'e', num_args = 1..)]
        exclude: Vec<String>,

        /// Also record directories, not just files.
        #[arg(long)]
        directories: bool,
    },
    /// Load the persisted catalog and print entries whose name contains every term.
    Search {
        /// Search terms (case-insensitive, all must match the file name).
        #[arg(value_name = "TERM")]
        terms: Vec<String>,

        /// Print at most N matches.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
}
