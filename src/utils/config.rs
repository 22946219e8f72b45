//! Application configuration: package-derived paths, tuning constants and [`IndexerConfig`].

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names and the application-data directory, built once then cached.
pub struct PackagePaths {
    data_dir: PathBuf,
    index_filename: String,
    log_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            // No platform data dir (minimal containers): fall back to a dot-dir in the cwd.
            let data_dir = dirs::data_dir()
                .map(|d| d.join(pkg))
                .unwrap_or_else(|| PathBuf::from(format!(".{pkg}")));
            PackagePaths {
                data_dir,
                index_filename: "index.json".to_string(),
                log_filename: "indexer.log".to_string(),
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn default_index_file(&self) -> PathBuf {
        self.data_dir.join(&self.index_filename)
    }

    pub fn default_log_file(&self) -> PathBuf {
        self.data_dir.join(&self.log_filename)
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.data_dir.join(&self.config_filename)
    }
}

// ---- Batching / cadence ----

/// Default batch sizes and cadences used by the coordinator.
pub struct BatchConsts;

impl BatchConsts {
    /// Save the catalog after this many new entries since the last save.
    pub const SAVE_BATCH_SIZE: usize = 5000;
    /// Emit a progress notification every N-th indexed entry.
    pub const PROGRESS_STRIDE: usize = 100;
    /// Records per sink append when republishing a query result.
    pub const UI_BATCH_SIZE: usize = 500;
    /// Records per batch when loading the persisted snapshot.
    pub const LOAD_BATCH_SIZE: usize = 1000;
    /// Records buffered by the walker before pushing them to the sink.
    pub const WALK_BATCH_SIZE: usize = 100;
}

// ---- Skip policy ----

/// Directory names that hold OS-protected volume metadata. Never descended into.
pub fn default_protected_dir_names() -> Vec<String> {
    let names: &[&str] = if cfg!(target_os = "windows") {
        &["System Volume Information", "$RECYCLE.BIN"]
    } else if cfg!(target_os = "macos") {
        &[
            ".Spotlight-V100",
            ".fseventsd",
            ".DocumentRevisions-V100",
            ".Trashes",
        ]
    } else {
        &["lost+found"]
    };
    names.iter().map(|s| s.to_string()).collect()
}

// ---- Indexer configuration ----

/// Configuration consumed by the [`Indexer`](crate::index::Indexer).
///
/// Every field has a default, so a `[settings]` table in `filedex.toml` only needs the keys it
/// overrides. See [`load_config`](crate::utils::load_config) for the full layering.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Roots to walk. Empty means "all ready drives".
    pub roots: Vec<PathBuf>,
    /// Snapshot location. When None, `<data dir>/filedex/index.json`.
    pub index_file: Option<PathBuf>,
    pub save_batch_size: usize,
    pub progress_stride: usize,
    pub ui_batch_size: usize,
    pub load_batch_size: usize,
    pub walk_batch_size: usize,
    /// Exclude patterns (`*` / `?` globs) matched against the name and the full path.
    pub exclude: Vec<String>,
    /// Also record directories (with `isDirectory = true`), not just files.
    pub index_directories: bool,
    /// Case-insensitive directory names that are never descended into.
    pub protected_dir_names: Vec<String>,
    /// Drop OS clutter files (`.DS_Store`, `Thumbs.db`, ...).
    pub skip_os_hidden: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            index_file: None,
            save_batch_size: BatchConsts::SAVE_BATCH_SIZE,
            progress_stride: BatchConsts::PROGRESS_STRIDE,
            ui_batch_size: BatchConsts::UI_BATCH_SIZE,
            load_batch_size: BatchConsts::LOAD_BATCH_SIZE,
            walk_batch_size: BatchConsts::WALK_BATCH_SIZE,
            exclude: Vec::new(),
            index_directories: false,
            protected_dir_names: default_protected_dir_names(),
            skip_os_hidden: true,
        }
    }
}

impl IndexerConfig {
    /// Snapshot path, defaulting to the application-data location.
    pub fn index_file(&self) -> PathBuf {
        self.index_file
            .clone()
            .unwrap_or_else(|| PackagePaths::get().default_index_file())
    }

    /// Clamp batch sizes and strides to at least 1 so no cadence divides by zero.
    pub fn normalized(mut self) -> Self {
        self.save_batch_size = self.save_batch_size.max(1);
        self.progress_stride = self.progress_stride.max(1);
        self.ui_batch_size = self.ui_batch_size.max(1);
        self.load_batch_size = self.load_batch_size.max(1);
        self.walk_batch_size = self.walk_batch_size.max(1);
        self
    }
}
