//! Upstream datasets: where they live and how their bytes are obtained.

pub mod fetch;
pub mod registry;

pub use fetch::{DirFetcher, Fetch, HttpFetcher};
pub use registry::{Dataset, Format, History};
