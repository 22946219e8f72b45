//! CLI command handlers: `index` walks and persists, `search` loads and queries.

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::engine::progress::ProgressObserver;
use crate::index::Indexer;
use crate::notify::{NullSink, ResultBuffer};
use crate::utils::config::{IndexerConfig, PackagePaths};
use crate::utils::{FileLogger, load_config, ready_drive_roots, setup_logging};

/// Indexer diagnostics go to `indexer.log` in the data dir, echoed to the console with `-v`.
fn file_logger(common: &CommonArgs) -> Arc<FileLogger> {
    Arc::new(FileLogger::new(PackagePaths::get().default_log_file()).echo(common.verbose))
}

fn setup_config(common: &CommonArgs) -> Result<IndexerConfig> {
    setup_logging(common.verbose);
    let mut cfg = load_config(common.config.as_deref())?;
    if let Some(ref p) = common.index_file {
        cfg.index_file = Some(p.clone());
    }
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), cfg);
    Ok(cfg)
}

fn resolve_roots(cfg: &IndexerConfig, roots: &[PathBuf], all_drives: bool) -> Vec<PathBuf> {
    if all_drives {
        ready_drive_roots()
    } else if !roots.is_empty() {
        roots.to_vec()
    } else if !cfg.roots.is_empty() {
        cfg.roots.clone()
    } else {
        ready_drive_roots()
    }
}

fn handle_index(
    common: &CommonArgs,
    roots: &[PathBuf],
    all_drives: bool,
    exclude: &[String],
    directories: bool,
) -> Result<()> {
    let mut cfg = setup_config(common)?;
    cfg.exclude.extend(exclude.iter().cloned());
    cfg.index_directories |= directories;
    let roots = resolve_roots(&cfg, roots, all_drives);
    info!("Indexing {} root(s)", roots.len());

    let mut builder = Indexer::builder(cfg)
        .with_sink(NullSink)
        .with_logger(file_logger(common));
    if common.verbose {
        builder = builder.with_observer(ProgressObserver::new("Indexing"));
    }
    let indexer = Arc::new(builder.build());

    let stopper = Arc::clone(&indexer);
    ctrlc::set_handler(move || {
        stopper.stop_indexing();
    })
    .context("set Ctrl+C handler")?;

    indexer.start_indexing(roots);
    indexer.wait();
    indexer.flush();

    info!(
        "{} {} entries -> {}",
        "Indexed".green(),
        indexer.indexed_count(),
        indexer.index_file().display()
    );
    if let Some(err) = indexer.last_error() {
        warn!("Last error: {}", err);
    }
    Ok(())
}

fn handle_search(common: &CommonArgs, terms: &[String], limit: Option<usize>) -> Result<()> {
    let cfg = setup_config(common)?;
    let results = ResultBuffer::new();
    let indexer = Indexer::builder(cfg)
        .with_sink(results.clone())
        .with_logger(file_logger(common))
        .build();

    let loaded = indexer.load_persisted();
    if loaded == 0 {
        warn!(
            "Index at {} is empty or missing; run `{} index` first",
            indexer.index_file().display(),
            env!("CARGO_PKG_NAME")
        );
    }
    let query = terms.join(" ");
    let total = indexer.search(&query);
    indexer.flush();

    let entries = results.entries();
    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    for e in &entries[..shown] {
        println!("{}", e.path.display());
    }
    info!(
        "{} of {} entries match {:?}",
        total.to_string().cyan(),
        loaded,
        query
    );
    Ok(())
}

/// Dispatch the parsed command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Index {
            roots,
            all_drives,
            exclude,
            directories,
        } => handle_index(&cli.common, roots, *all_drives, exclude, *directories),
        Commands::Search { terms, limit } => handle_search(&cli.common, terms, *limit),
    }
}
