//! Adapters from canonical histories to tagged points.
//!
//! Each report shape has its own adapter; they only meet here, as `Point`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{
    AggregateHistory, CountryReport, Metric, MunicipalityReport, ProvinceReport, RegionTimeline, ReportHistory,
};
use crate::error::IngestError;
use crate::io::fields::{parse_date_value, SHORT_US_DATE};

pub const COUNTRY_MEASUREMENT: &str = "country";
pub const AGGREGATE_MEASUREMENT: &str = "nl";
pub const MUNICIPALITY_MEASUREMENT: &str = "nl_municipality";
pub const PROVINCE_MEASUREMENT: &str = "nl_province";
pub const TIMELINE_MEASUREMENT: &str = "reports";

/// One time-series sample: integer fields at midnight UTC of `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub measurement: &'static str,
    pub tags: BTreeMap<&'static str, String>,
    pub fields: BTreeMap<String, i64>,
    pub date: NaiveDate,
}

impl Point {
    pub fn new(measurement: &'static str, date: NaiveDate) -> Self {
        Self {
            measurement,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            date,
        }
    }

    /// Add a tag; empty values are dropped since the store cannot hold them.
    pub fn tag(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.tags.insert(key, value);
        }
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: i64) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
    }
}

pub fn country_points(metric: Metric, date: NaiveDate, reports: &[CountryReport]) -> Vec<Point> {
    reports
        .iter()
        .map(|r| {
            Point::new(COUNTRY_MEASUREMENT, date)
                .tag("country", &r.country)
                .tag("province", &r.province)
                .field(metric.as_str(), r.amount)
        })
        .collect()
}

pub fn aggregate_points(metric: Metric, history: &AggregateHistory) -> Vec<Point> {
    history
        .iter()
        .map(|(date, amount)| Point::new(AGGREGATE_MEASUREMENT, *date).field(metric.as_str(), *amount))
        .collect()
}

pub fn municipality_points(history: &ReportHistory<MunicipalityReport>) -> Vec<Point> {
    history
        .iter()
        .flat_map(|(date, reports)| {
            reports.iter().map(move |r| {
                Point::new(MUNICIPALITY_MEASUREMENT, *date)
                    .tag("municipality", &r.municipality)
                    .tag("municipality_code", r.municipality_code.to_string())
                    .tag("province", &r.province)
                    .field(Metric::Hospitalized.as_str(), r.amount)
            })
        })
        .collect()
}

pub fn province_points(history: &ReportHistory<ProvinceReport>) -> Vec<Point> {
    history
        .iter()
        .flat_map(|(date, reports)| {
            reports.iter().map(move |r| {
                Point::new(PROVINCE_MEASUREMENT, *date)
                    .tag("province", &r.province)
                    .field("cases", r.amount)
            })
        })
        .collect()
}

/// One point per date in `cases`, with `deaths` merged in when the same date
/// key is present there. A date key that does not parse fails the region.
pub fn timeline_points(region: &RegionTimeline) -> Result<Vec<Point>, IngestError> {
    let mut points = Vec::with_capacity(region.timeline.cases.len());
    for (key, cases) in &region.timeline.cases {
        let date = parse_date_value(key, SHORT_US_DATE).map_err(|reason| IngestError::InvalidTimelineDate {
            country: region.country.clone(),
            value: key.clone(),
            reason,
        })?;

        let mut point = Point::new(TIMELINE_MEASUREMENT, date)
            .tag("country", &region.country)
            .tag("province", &region.province)
            .field("cases", *cases);
        if let Some(deaths) = region.timeline.deaths.get(key) {
            point = point.field("deaths", *deaths);
        }
        points.push(point);
    }
    Ok(points)
}
