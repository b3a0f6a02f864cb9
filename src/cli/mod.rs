//! Command-line parsing for the ingest binary.
//!
//! Argument parsing and dispatch stay here; the pipeline itself never sees clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::Dataset;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "epi",
    version,
    about = "Normalize epidemiological time series and write them to InfluxDB"
)]
pub struct Cli {
    /// Log level when `RUST_LOG` is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, normalize and write datasets (all of them unless `--dataset` is given).
    Run(RunArgs),
    /// Parse a local file as one dataset and print its points as line protocol.
    Parse(ParseArgs),
    /// List the known datasets with their format and source URL.
    Datasets,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Dataset to ingest; repeat for several. Defaults to all, in registry order.
    #[arg(short = 'd', long = "dataset", value_enum)]
    pub datasets: Vec<Dataset>,

    /// Print line protocol to stdout instead of writing to InfluxDB.
    #[arg(long)]
    pub dry_run: bool,

    /// Read mirrored source files from this directory instead of fetching them.
    #[arg(long, value_name = "DIR")]
    pub from_dir: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ParseArgs {
    /// Which dataset layout the file follows.
    #[arg(short = 'd', long, value_enum)]
    pub dataset: Dataset,

    /// File to parse.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
