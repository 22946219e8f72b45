//! filedex CLI: `index` walks local storage into the catalog, `search` queries it.

use anyhow::Result;
use clap::Parser;
use filedex::engine::arg_parser::Cli;
use filedex::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
