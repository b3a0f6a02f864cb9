//! Time-series sinks.
//!
//! A sink only has to accept points (`write_points`); the batch helpers turn
//! each canonical history shape into points through the adapters in `points`.

use chrono::NaiveDate;

use crate::domain::{
    AggregateHistory, CountryReport, Metric, MunicipalityReport, ProvinceReport, RegionTimeline, ReportHistory,
};
use crate::error::SinkError;

pub mod influx;
pub mod line_protocol;
pub mod points;

pub use influx::InfluxSink;
pub use line_protocol::LineWriterSink;
pub use points::Point;

/// Destination for normalized points. Every call returns the number of points
/// written.
pub trait MetricSink {
    fn write_points(&mut self, points: Vec<Point>) -> Result<usize, SinkError>;

    fn write_country(
        &mut self,
        metric: Metric,
        date: NaiveDate,
        reports: &[CountryReport],
    ) -> Result<usize, SinkError> {
        self.write_points(points::country_points(metric, date, reports))
    }

    fn write_aggregate(&mut self, metric: Metric, history: &AggregateHistory) -> Result<usize, SinkError> {
        self.write_points(points::aggregate_points(metric, history))
    }

    fn write_municipality(&mut self, history: &ReportHistory<MunicipalityReport>) -> Result<usize, SinkError> {
        self.write_points(points::municipality_points(history))
    }

    fn write_province(&mut self, history: &ReportHistory<ProvinceReport>) -> Result<usize, SinkError> {
        self.write_points(points::province_points(history))
    }

    fn write_timeline(&mut self, region: &RegionTimeline) -> Result<usize, SinkError> {
        self.write_points(points::timeline_points(region)?)
    }
}
