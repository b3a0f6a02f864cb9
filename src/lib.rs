//! `epi-ingest` library crate.
//!
//! The binary (`epi`) is a thin wrapper around this library so that:
//!
//! - every parser is testable on in-memory bytes without the network
//! - the pipeline can run against any fetcher and any sink
//! - the I/O glue (HTTP, env config, InfluxDB) stays out of the normalization code

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod sink;

#[cfg(test)]
mod test_http;
