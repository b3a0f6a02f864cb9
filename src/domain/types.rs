//! Canonical history types.
//!
//! Every source format converges to one of these shapes. They are plain values:
//! built once per fetch, never updated in place, consumed once by a sink.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Province label used when the narrow province file leaves the column empty.
pub const PROVINCE_UNKNOWN: &str = "Onbekend";

/// Municipality name used when the municipality column is empty.
pub const MUNICIPALITY_UNKNOWN: &str = "Unknown";

/// Municipality code used when the code column is empty.
pub const MUNICIPALITY_CODE_UNKNOWN: i64 = -1;

/// Which quantity a series counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    Hospitalized,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
            Metric::Hospitalized => "hospitalized",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Country-level measurement. An empty `province` means "no sub-region".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryReport {
    pub country: String,
    pub province: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalityReport {
    pub municipality: String,
    pub municipality_code: i64,
    pub province: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceReport {
    pub province: String,
    pub amount: i64,
}

/// Date-keyed regional measurements.
///
/// Within a date, reports keep source order.
pub type ReportHistory<R> = BTreeMap<NaiveDate, Vec<R>>;

/// Date-keyed totals without a regional dimension.
pub type AggregateHistory = BTreeMap<NaiveDate, i64>;

/// Per-region cumulative counts keyed by the document's own date strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Timeline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cases: BTreeMap<String, i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deaths: BTreeMap<String, i64>,
}

/// One region of the nested historical document.
///
/// Missing or `null` members decode to their empty value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionTimeline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Timeline,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Total number of reports across all dates.
pub fn report_count<R>(history: &ReportHistory<R>) -> usize {
    history.values().map(Vec::len).sum()
}
