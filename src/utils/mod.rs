pub mod config;
pub mod drives;
pub mod filedex_toml;
pub mod logger;
pub mod tempfiles;

pub use config::*;
pub use drives::ready_drive_roots;
pub use filedex_toml::{config_from_toml_str, load_config};
pub use logger::{FileLogger, IndexLogger, LogFacade, setup_logging};
pub use tempfiles::{remove_stale_temp, temp_path_for};
