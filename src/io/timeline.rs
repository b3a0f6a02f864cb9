//! Nested historical document: a JSON array of regions, each with date-keyed
//! case and death counts.
//!
//! ```json
//! [{"country": "Netherlands", "province": null,
//!   "timeline": {"cases": {"3/1/20": 10}, "deaths": {"3/1/20": 0}}}]
//! ```

use std::io::{BufReader, Read};

use crate::domain::RegionTimeline;
use crate::error::IngestError;

/// Decode the document as-is. Date keys are validated later, when points are
/// built from each region.
pub fn parse_timelines<R: Read>(reader: R) -> Result<Vec<RegionTimeline>, IngestError> {
    serde_json::from_reader(BufReader::new(reader)).map_err(|source| IngestError::Json { source })
}
