//! Domain types shared by parsers, sinks and the pipeline.
//!
//! This module defines:
//!
//! - the metric enumeration (`Metric`)
//! - regional report shapes (`CountryReport`, `MunicipalityReport`, `ProvinceReport`)
//! - canonical histories (`ReportHistory`, `AggregateHistory`, `RegionTimeline`)

pub mod types;

pub use types::*;
