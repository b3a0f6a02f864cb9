//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - picks the fetcher (HTTP or mirror directory) and the sink (InfluxDB or stdout)
//! - runs the ingest pipeline and reports what was written

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ParseArgs, RunArgs};
use crate::config::InfluxConfig;
use crate::data::{Dataset, DirFetcher, Fetch, HttpFetcher};
use crate::error::AppError;
use crate::sink::{InfluxSink, LineWriterSink, MetricSink};

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    // `epi` and `epi --dry-run` behave like `epi run ...`; see `rewrite_args`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init(cli.log_level);

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Parse(args) => handle_parse(&args),
        Command::Datasets => {
            handle_datasets();
            Ok(())
        }
    }
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let datasets = if args.datasets.is_empty() {
        Dataset::ALL.to_vec()
    } else {
        args.datasets.clone()
    };

    let fetcher = build_fetcher(args.from_dir.as_deref())?;
    let mut sink = build_sink(args.dry_run)?;

    let output = pipeline::run_datasets(&datasets, fetcher.as_ref(), sink.as_mut())?;

    for summary in &output.datasets {
        info!(
            dataset = %summary.dataset,
            entries = summary.entries,
            points = summary.points,
            "dataset done"
        );
    }
    info!(
        datasets = output.datasets.len(),
        points = output.total_points(),
        "ingest finished"
    );
    Ok(())
}

fn handle_parse(args: &ParseArgs) -> Result<(), AppError> {
    let mut sink = LineWriterSink::new(std::io::stdout().lock());
    let summary = pipeline::run_file(args.dataset, &args.file, &mut sink)?;

    info!(
        dataset = %summary.dataset,
        entries = summary.entries,
        points = summary.points,
        "file parsed"
    );
    Ok(())
}

fn handle_datasets() {
    for dataset in Dataset::ALL {
        println!(
            "{:<30} {:<18} {}",
            dataset.name(),
            dataset.format().as_str(),
            dataset.url()
        );
    }
}

fn build_fetcher(from_dir: Option<&Path>) -> Result<Box<dyn Fetch>, AppError> {
    match from_dir {
        Some(dir) => Ok(Box::new(DirFetcher::new(dir))),
        None => {
            let fetcher = HttpFetcher::new().map_err(|e| AppError::ingest("Cannot create HTTP client", &e))?;
            Ok(Box::new(fetcher))
        }
    }
}

fn build_sink(dry_run: bool) -> Result<Box<dyn MetricSink>, AppError> {
    if dry_run {
        return Ok(Box::new(LineWriterSink::new(std::io::stdout().lock())));
    }

    let config = InfluxConfig::from_env()?;
    info!(url = %config.url, bucket = %config.bucket, org = %config.org, "writing to InfluxDB");
    let sink = InfluxSink::new(config).map_err(|e| AppError::sink("Cannot create InfluxDB client", &e))?;
    Ok(Box::new(sink))
}

/// Rewrite argv so `epi` defaults to `epi run`.
///
/// Rules:
/// - `epi`                         -> `epi run`
/// - `epi --dry-run ...`           -> `epi run --dry-run ...`
/// - `epi --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "parse" | "datasets");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
