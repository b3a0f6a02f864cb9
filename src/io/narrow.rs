//! Narrow-format tables: one row per (date, region) pair, date first.

use std::io::Read;

use csv::StringRecord;

use crate::domain::{
    AggregateHistory, MunicipalityReport, ProvinceReport, ReportHistory, MUNICIPALITY_CODE_UNKNOWN,
    MUNICIPALITY_UNKNOWN, PROVINCE_UNKNOWN,
};
use crate::error::IngestError;
use crate::io::fields::{self, ISO_DATE};

/// `date,amount` totals without a regional dimension.
///
/// The amount is trimmed before parsing; a repeated date keeps the last value.
pub fn parse_aggregate_history<R: Read>(reader: R) -> Result<AggregateHistory, IngestError> {
    let mut csv = fields::csv_reader(reader);
    fields::read_header(&mut csv)?;

    let mut history = AggregateHistory::new();
    let mut record = StringRecord::new();
    while fields::next_record(&mut csv, &mut record)? {
        fields::ensure_width(&record, 2)?;
        let line = fields::line_of(&record);

        let date = fields::parse_date(&record[0], ISO_DATE, line)?;
        let amount = fields::parse_int("amount", record[1].trim(), line)?;
        history.insert(date, amount);
    }

    Ok(history)
}

/// `date,municipality,municipality_code,province,amount` rows.
pub fn parse_municipality_history<R: Read>(
    reader: R,
) -> Result<ReportHistory<MunicipalityReport>, IngestError> {
    let mut csv = fields::csv_reader(reader);
    fields::read_header(&mut csv)?;

    let mut history = ReportHistory::new();
    let mut record = StringRecord::new();
    while fields::next_record(&mut csv, &mut record)? {
        fields::ensure_width(&record, 5)?;
        let line = fields::line_of(&record);

        let date = fields::parse_date(&record[0], ISO_DATE, line)?;
        let reports: &mut Vec<MunicipalityReport> = history.entry(date).or_default();

        let municipality = match &record[1] {
            "" => MUNICIPALITY_UNKNOWN.to_string(),
            name => name.to_string(),
        };
        let municipality_code = match &record[2] {
            "" => MUNICIPALITY_CODE_UNKNOWN,
            code => fields::parse_int("municipality code", code, line)?,
        };
        let amount = fields::parse_int("amount", &record[4], line)?;

        reports.push(MunicipalityReport {
            municipality,
            municipality_code,
            province: record[3].to_string(),
            amount,
        });
    }

    Ok(history)
}

/// `date,province,amount` rows; an empty province is reported as unknown.
pub fn parse_province_history<R: Read>(reader: R) -> Result<ReportHistory<ProvinceReport>, IngestError> {
    let mut csv = fields::csv_reader(reader);
    fields::read_header(&mut csv)?;

    let mut history = ReportHistory::new();
    let mut record = StringRecord::new();
    while fields::next_record(&mut csv, &mut record)? {
        fields::ensure_width(&record, 3)?;
        let line = fields::line_of(&record);

        let date = fields::parse_date(&record[0], ISO_DATE, line)?;
        let reports: &mut Vec<ProvinceReport> = history.entry(date).or_default();

        let province = match &record[1] {
            "" => PROVINCE_UNKNOWN.to_string(),
            name => name.to_string(),
        };
        let amount = fields::parse_int("amount", &record[2], line)?;

        reports.push(ProvinceReport { province, amount });
    }

    Ok(history)
}
