//! Load `filedex.toml` and environment overrides into an [`IndexerConfig`].
//!
//! Layering, last wins: defaults → `[settings]` in `filedex.toml` → `FILEDEX_*` env vars
//! (after an optional `.env` is read by dotenvy). CLI flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::{IndexerConfig, PackagePaths};

const ENV_INDEX_FILE: &str = "FILEDEX_INDEX_FILE";
const ENV_ROOTS: &str = "FILEDEX_ROOTS";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FiledexToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    roots: Option<Vec<PathBuf>>,
    index_file: Option<PathBuf>,
    save_batch_size: Option<usize>,
    progress_stride: Option<usize>,
    ui_batch_size: Option<usize>,
    load_batch_size: Option<usize>,
    walk_batch_size: Option<usize>,
    exclude: Option<Vec<String>>,
    index_directories: Option<bool>,
    protected_dir_names: Option<Vec<String>>,
    skip_os_hidden: Option<bool>,
}

/// Overwrite config field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $cfg:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $section.$field.clone() {
                $cfg.$field = v;
            }
        )+
    };
}

fn apply_file_to_config(file: &FiledexToml, cfg: &mut IndexerConfig) {
    let s = &file.settings;
    apply_file_opt!(
        s,
        cfg,
        roots,
        save_batch_size,
        progress_stride,
        ui_batch_size,
        load_batch_size,
        walk_batch_size,
        exclude,
        index_directories,
        protected_dir_names,
        skip_os_hidden,
    );
    if let Some(ref p) = s.index_file {
        cfg.index_file = Some(p.clone());
    }
}

/// Parse a TOML document into a config layered over the defaults.
pub fn config_from_toml_str(s: &str) -> Result<IndexerConfig> {
    let file: FiledexToml = toml::from_str(s).context("parse config")?;
    let mut cfg = IndexerConfig::default();
    apply_file_to_config(&file, &mut cfg);
    Ok(cfg)
}

fn apply_env(cfg: &mut IndexerConfig) {
    if let Ok(p) = std::env::var(ENV_INDEX_FILE) {
        let p = p.trim();
        if !p.is_empty() {
            cfg.index_file = Some(PathBuf::from(p));
        }
    }
    if let Ok(roots) = std::env::var(ENV_ROOTS) {
        let roots: Vec<PathBuf> = std::env::split_paths(&roots)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if !roots.is_empty() {
            cfg.roots = roots;
        }
    }
}

/// Build the effective config. `explicit` must exist when given; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<IndexerConfig> {
    let _ = dotenvy::dotenv();

    let mut cfg = match explicit {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            config_from_toml_str(&s).with_context(|| format!("in {}", path.display()))?
        }
        None => {
            let path = PackagePaths::get().default_config_file();
            match std::fs::read_to_string(&path) {
                Ok(s) => config_from_toml_str(&s)
                    .map_err(|e| log::warn!("{}: {:#}", path.display(), e))
                    .unwrap_or_default(),
                Err(_) => IndexerConfig::default(),
            }
        }
    };
    apply_env(&mut cfg);
    Ok(cfg.normalized())
}
