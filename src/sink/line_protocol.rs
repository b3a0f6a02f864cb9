//! InfluxDB line protocol encoding and a sink that just writes the lines.

use std::io::Write;

use super::points::Point;
use super::MetricSink;
use crate::error::SinkError;

/// Render one point as `measurement,tag=v field=1i 1579651200`.
pub fn encode(point: &Point) -> String {
    let mut line = escape(point.measurement, &[',', ' ']);
    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape(key, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(value, &[',', '=', ' ']));
    }

    let fields: Vec<String> = point
        .fields
        .iter()
        .map(|(key, value)| format!("{}={value}i", escape(key, &[',', '=', ' '])))
        .collect();
    line.push(' ');
    line.push_str(&fields.join(","));

    line.push(' ');
    line.push_str(&point.timestamp().to_string());
    line
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Writes encoded points to any writer, one per line.
///
/// Used for `--dry-run` (stdout) and for inspecting a single file.
pub struct LineWriterSink<W: Write> {
    writer: W,
}

impl<W: Write> LineWriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricSink for LineWriterSink<W> {
    fn write_points(&mut self, points: Vec<Point>) -> Result<usize, SinkError> {
        for point in &points {
            writeln!(self.writer, "{}", encode(point))?;
        }
        self.writer.flush()?;
        Ok(points.len())
    }
}
