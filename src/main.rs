//! # emharvest
//!
//! Command-line front end: extracts the acquisition metadata of a cryo-EM
//! dataset directory and hands the merged record to the schema converter.
//!
//! ## Usage
//!
//! ```bash
//! # Extract a dataset, also keeping the full record and an XML archive
//! emharvest extract /data/grid_01 -f -z
//!
//! # Store instrument constants and the EPU mirror folder
//! emharvest configure
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
