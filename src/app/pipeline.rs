//! Shared ingest pipeline used by every CLI command.
//!
//! fetch -> parse -> write, one dataset at a time. The first failure stops the
//! run: a dataset is either written from a fully valid history or not at all.

use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::data::{Dataset, Fetch, History};
use crate::error::{AppError, SinkError};
use crate::sink::MetricSink;

/// What was written for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub dataset: Dataset,
    /// Dates (or regions, for timelines) in the parsed history.
    pub entries: usize,
    pub points: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub datasets: Vec<DatasetSummary>,
}

impl RunOutput {
    pub fn total_points(&self) -> usize {
        self.datasets.iter().map(|d| d.points).sum()
    }
}

/// Ingest `datasets` in order.
pub fn run_datasets(
    datasets: &[Dataset],
    fetcher: &dyn Fetch,
    sink: &mut dyn MetricSink,
) -> Result<RunOutput, AppError> {
    let mut output = RunOutput::default();

    for &dataset in datasets {
        let url = dataset.url();
        debug!(%dataset, %url, format = dataset.format().as_str(), "starting dataset");

        // The body reader is dropped at the end of this block, parsed or not.
        let history = {
            let reader = fetcher
                .fetch(&url)
                .map_err(|e| AppError::ingest(format!("Getting {dataset} reports failed"), &e))?;
            dataset
                .parse(reader)
                .map_err(|e| AppError::ingest(format!("Getting {dataset} reports failed"), &e))?
        };

        output.datasets.push(write_dataset(dataset, &history, sink)?);
    }

    Ok(output)
}

/// Parse one local file as `dataset` and write it.
pub fn run_file(dataset: Dataset, path: &Path, sink: &mut dyn MetricSink) -> Result<DatasetSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    let history = dataset
        .parse(file)
        .map_err(|e| AppError::ingest(format!("Parsing '{}' as {dataset} failed", path.display()), &e))?;

    write_dataset(dataset, &history, sink)
}

fn write_dataset(
    dataset: Dataset,
    history: &History,
    sink: &mut dyn MetricSink,
) -> Result<DatasetSummary, AppError> {
    info!(%dataset, entries = history.len(), "parsed dataset");
    let points = write_history(history, sink)?;
    info!(%dataset, points, "wrote dataset");

    Ok(DatasetSummary {
        dataset,
        entries: history.len(),
        points,
    })
}

/// Hand a history to the sink, one call per logical batch.
pub fn write_history(history: &History, sink: &mut dyn MetricSink) -> Result<usize, AppError> {
    let write_err = |e: SinkError| AppError::sink("Cannot write metrics", &e);
    let mut total = 0;

    match history {
        History::Country { metric, history } => {
            for (date, reports) in history {
                let n = sink.write_country(*metric, *date, reports).map_err(write_err)?;
                debug!("Wrote {n} `{metric}` country metric(s) for {date}.");
                total += n;
            }
        }
        History::Aggregate { metric, history } => {
            total += sink.write_aggregate(*metric, history).map_err(write_err)?;
        }
        History::Municipality(history) => {
            total += sink.write_municipality(history).map_err(write_err)?;
        }
        History::Province(history) => {
            total += sink.write_province(history).map_err(write_err)?;
        }
        History::Timelines(regions) => {
            for region in regions {
                let n = sink.write_timeline(region).map_err(write_err)?;
                debug!(
                    country = %region.country,
                    province = %region.province,
                    "Wrote {n} timeline metric(s)."
                );
                total += n;
            }
        }
    }

    Ok(total)
}
