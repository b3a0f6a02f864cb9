//! Wide-format country tables: one row per region, one column per date.
//!
//! Layout of the global time-series files:
//!
//! ```text
//! Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,...
//! ,Andorra,42.5,1.5,0,0,...
//! ```

use std::collections::HashSet;
use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CountryReport, ReportHistory};
use crate::error::IngestError;
use crate::io::fields::{self, SHORT_US_DATE, SHORT_US_DATE_OUT};

const PROVINCE_COL: usize = 0;
const COUNTRY_COL: usize = 1;
/// Columns before the first date: province, country, lat, long.
const LEADING_COLS: usize = 4;

/// Parse a wide country table into a per-date history.
pub fn parse_country_history<R: Read>(reader: R) -> Result<ReportHistory<CountryReport>, IngestError> {
    let mut csv = fields::csv_reader(reader);

    let header = fields::read_header(&mut csv)?;
    let dates = parse_header_dates(&header)?;

    let mut history: ReportHistory<CountryReport> = dates.iter().map(|d| (*d, Vec::new())).collect();

    let mut record = StringRecord::new();
    while fields::next_record(&mut csv, &mut record)? {
        fields::ensure_width(&record, dates.len() + LEADING_COLS)?;
        let line = fields::line_of(&record);

        let province = &record[PROVINCE_COL];
        let country = &record[COUNTRY_COL];

        for (date, raw) in dates.iter().zip(record.iter().skip(LEADING_COLS)) {
            let amount = fields::parse_int("amount", raw, line)?;
            history.entry(*date).or_default().push(CountryReport {
                country: country.to_string(),
                province: province.to_string(),
                amount,
            });
        }
    }

    Ok(history)
}

fn parse_header_dates(header: &StringRecord) -> Result<Vec<NaiveDate>, IngestError> {
    if header.len() <= LEADING_COLS {
        return Err(IngestError::ColumnCount {
            line: fields::line_of(header),
            found: header.len(),
            expected: format!("at least {}", LEADING_COLS + 1),
        });
    }

    let line = fields::line_of(header);
    let mut seen = HashSet::with_capacity(header.len() - LEADING_COLS);
    let mut dates = Vec::with_capacity(header.len() - LEADING_COLS);
    for raw in header.iter().skip(LEADING_COLS) {
        let date = fields::parse_date(raw, SHORT_US_DATE, line)?;
        if !seen.insert(date) {
            return Err(IngestError::DuplicateDate { date });
        }
        dates.push(date);
    }
    Ok(dates)
}

/// Write a history back out in the wide layout it was parsed from.
///
/// Row `i` is rebuilt from element `i` of every date, which is how
/// [`parse_country_history`] lays them out. Lat/long are not kept by the parser
/// and are written as `0`. Returns the number of region rows written.
pub fn write_country_history<W: Write>(
    history: &ReportHistory<CountryReport>,
    writer: W,
) -> Result<usize, IngestError> {
    let rows = history.values().next().map_or(0, Vec::len);
    for (date, reports) in history {
        if reports.len() != rows {
            return Err(IngestError::NotRectangular {
                reason: format!("{date} has {} regions, expected {rows}", reports.len()),
            });
        }
    }

    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![
        "Province/State".to_string(),
        "Country/Region".to_string(),
        "Lat".to_string(),
        "Long".to_string(),
    ];
    header.extend(history.keys().map(|d| d.format(SHORT_US_DATE_OUT).to_string()));
    csv.write_record(&header)
        .map_err(|e| IngestError::csv("header CSV record", e))?;

    let columns: Vec<(&NaiveDate, &Vec<CountryReport>)> = history.iter().collect();
    for i in 0..rows {
        let Some((_, first)) = columns.first() else { break };
        let region = &first[i];

        let mut row = vec![
            region.province.clone(),
            region.country.clone(),
            "0".to_string(),
            "0".to_string(),
        ];
        for (date, reports) in &columns {
            let report = &reports[i];
            if report.country != region.country || report.province != region.province {
                return Err(IngestError::NotRectangular {
                    reason: format!(
                        "row {i} is {}/{} on {date} but {}/{} on the first date",
                        report.country, report.province, region.country, region.province
                    ),
                });
            }
            row.push(report.amount.to_string());
        }
        csv.write_record(&row)
            .map_err(|e| IngestError::csv("CSV record", e))?;
    }

    csv.flush()
        .map_err(|e| IngestError::csv("CSV record", csv::Error::from(e)))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::report_count;
    use crate::error::ErrorKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.0,65.0,0,0,1
Australian Capital Territory,Australia,-35.47,149.01,0,2,3
,Andorra,42.5,1.52,5,5,-1
";

    #[test]
    fn single_country_scenario() {
        let input = "Province,Country,Lat,Long,1/22/20,1/23/20\n,Andorra,0,0,1,2\n";
        let history = parse_country_history(input.as_bytes()).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(
            history[&date(2020, 1, 22)],
            vec![CountryReport {
                country: "Andorra".to_string(),
                province: String::new(),
                amount: 1,
            }]
        );
        assert_eq!(history[&date(2020, 1, 23)][0].amount, 2);
    }

    #[test]
    fn counts_match_table_shape() {
        let history = parse_country_history(SAMPLE.as_bytes()).unwrap();
        // 7 header columns - 4 leading columns
        assert_eq!(history.len(), 3);
        // 3 rows x 3 dates
        assert_eq!(report_count(&history), 9);

        let day3 = &history[&date(2020, 1, 24)];
        let countries: Vec<&str> = day3.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, ["Afghanistan", "Australia", "Andorra"]);
        assert_eq!(day3[1].province, "Australian Capital Territory");
        assert_eq!(day3[2].amount, -1);
    }

    #[test]
    fn header_only_yields_empty_date_entries() {
        let history = parse_country_history("p,c,lat,long,3/1/20\n".as_bytes()).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[&date(2020, 3, 1)].is_empty());
    }

    #[test]
    fn short_header_is_rejected() {
        let err = parse_country_history("p,c,lat,long\n,x,0,0\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().starts_with("unexpected column length (4"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_country_history("".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader));
    }

    #[test]
    fn unparsable_header_date_is_rejected() {
        let err = parse_country_history("p,c,lat,long,1/22/20,Jan 23\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { ref value, .. } if value == "Jan 23"));

        let err = parse_country_history("p,c,lat,long,1/22/20,1/23/0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { ref value, .. } if value == "1/23/0"));
    }

    #[test]
    fn repeated_header_date_is_rejected() {
        let err = parse_country_history("p,c,lat,long,1/22/20,01/22/20\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateDate { .. }));
    }

    #[test]
    fn divergent_row_aborts_the_parse() {
        let input = "p,c,lat,long,1/22/20,1/23/20\n,A,0,0,1,2\n,B,0,0,1\n";
        let err = parse_country_history(input.as_bytes()).unwrap_err();
        match err {
            IngestError::ColumnCount { line, found, .. } => {
                assert_eq!(line, 3);
                assert_eq!(found, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_amount_aborts_after_valid_rows() {
        let mut input = String::from("p,c,lat,long,1/22/20\n");
        for i in 0..50 {
            input.push_str(&format!(",C{i},0,0,{i}\n"));
        }
        input.push_str(",Bad,0,0,12a\n");

        let err = parse_country_history(input.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidNumber { line: 52, field: "amount", .. }));
    }

    #[test]
    fn round_trip_preserves_triples() {
        let history = parse_country_history(SAMPLE.as_bytes()).unwrap();

        let mut out = Vec::new();
        let rows = write_country_history(&history, &mut out).unwrap();
        assert_eq!(rows, 3);

        let reparsed = parse_country_history(out.as_slice()).unwrap();

        let triples = |h: &ReportHistory<CountryReport>| -> BTreeSet<(NaiveDate, String, String, i64)> {
            h.iter()
                .flat_map(|(d, reports)| {
                    reports
                        .iter()
                        .map(move |r| (*d, r.country.clone(), r.province.clone(), r.amount))
                })
                .collect()
        };
        assert_eq!(triples(&history), triples(&reparsed));
        assert_eq!(history, reparsed);
    }

    #[test]
    fn ragged_history_cannot_be_written() {
        let mut history = parse_country_history(SAMPLE.as_bytes()).unwrap();
        history.get_mut(&date(2020, 1, 23)).unwrap().pop();

        let err = write_country_history(&history, Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }
}
