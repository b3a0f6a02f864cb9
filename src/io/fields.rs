//! Field-level rules shared by every CSV parser.
//!
//! The policy is strict: the first field that fails to parse aborts the whole
//! source, so helpers here return `IngestError` rather than skipping.

use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::IngestError;

/// `1/22/20`: header dates of the global files and keys of the JSON timelines.
pub const SHORT_US_DATE: &str = "%m/%d/%y";

/// `2020-03-01`: row dates of the narrow files.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Format used when writing `SHORT_US_DATE` back out (no zero padding).
pub const SHORT_US_DATE_OUT: &str = "%-m/%-d/%y";

/// CSV reader with header handling and column counting left to the caller.
pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Read the first record; an empty stream has no header and is rejected.
pub(crate) fn read_header<R: Read>(reader: &mut csv::Reader<R>) -> Result<StringRecord, IngestError> {
    let mut header = StringRecord::new();
    let found = reader
        .read_record(&mut header)
        .map_err(|e| IngestError::csv("header CSV record", e))?;
    if !found {
        return Err(IngestError::MissingHeader);
    }
    Ok(header)
}

/// Read the next data record into `record`; `false` at end of stream.
pub(crate) fn next_record<R: Read>(
    reader: &mut csv::Reader<R>,
    record: &mut StringRecord,
) -> Result<bool, IngestError> {
    reader
        .read_record(record)
        .map_err(|e| IngestError::csv("CSV record", e))
}

pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Reject a record whose width differs from `expected`.
pub(crate) fn ensure_width(record: &StringRecord, expected: usize) -> Result<(), IngestError> {
    if record.len() != expected {
        return Err(IngestError::ColumnCount {
            line: line_of(record),
            found: record.len(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(value: &str, format: &str, line: u64) -> Result<NaiveDate, IngestError> {
    parse_date_value(value, format).map_err(|reason| IngestError::InvalidDate {
        line,
        value: value.to_string(),
        reason,
    })
}

/// Parse `value` in `format`, failing with a human-readable reason.
///
/// chrono is lenient about widths and signs (`20-03-01` is year 20,
/// `1/22/0` is 2000), so the textual layout is checked before parsing.
pub fn parse_date_value(value: &str, format: &str) -> Result<NaiveDate, String> {
    if !has_layout(value, format) {
        return Err(format!("expected layout `{format}`"));
    }
    NaiveDate::parse_from_str(value, format).map_err(|e| e.to_string())
}

/// Digit counts per field: ISO dates are fully padded with a 4-digit year,
/// short US dates allow 1-2 digit month/day and need a 2-digit year.
fn has_layout(value: &str, format: &str) -> bool {
    let (separator, widths): (char, [(usize, usize); 3]) = match format {
        ISO_DATE => ('-', [(4, 4), (2, 2), (2, 2)]),
        SHORT_US_DATE => ('/', [(1, 2), (1, 2), (2, 2)]),
        _ => return true,
    };

    let parts: Vec<&str> = value.split(separator).collect();
    parts.len() == 3
        && parts.iter().zip(widths).all(|(part, (min, max))| {
            (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        })
}

/// Parse a signed integer. Negative values are upstream corrections and pass.
pub fn parse_int(field: &'static str, value: &str, line: u64) -> Result<i64, IngestError> {
    value.parse::<i64>().map_err(|e| IngestError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
