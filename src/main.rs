//! Termrank CLI: watch a directory and report its files ranked by TF-IDF.

use anyhow::Result;
use clap::Parser;
use termrank::engine::arg_parser::Cli;
use termrank::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
