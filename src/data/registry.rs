//! The fixed set of upstream datasets and how each one is decoded.

use std::io::Read;

use clap::ValueEnum;

use crate::domain::{
    AggregateHistory, CountryReport, Metric, MunicipalityReport, ProvinceReport, RegionTimeline, ReportHistory,
};
use crate::error::IngestError;
use crate::io;

const CSSE_BASE: &str =
    "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";
const CORONAWATCH_NL_BASE: &str = "https://raw.githubusercontent.com/J535D165/CoronaWatchNL/master/data";

/// Shape of a dataset's byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Region rows, one column per date.
    Wide,
    /// `date,amount`.
    Aggregate,
    /// `date,municipality,code,province,amount`.
    Municipality,
    /// `date,province,amount`.
    Province,
    /// JSON array of region timelines.
    Timeline,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Wide => "wide csv",
            Format::Aggregate => "date/amount csv",
            Format::Municipality => "municipality csv",
            Format::Province => "province csv",
            Format::Timeline => "json timelines",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dataset {
    Confirmed,
    Deaths,
    Recovered,
    NlHospitalized,
    NlHospitalizedMunicipality,
    NlDeaths,
    NlCasesProvince,
    Historical,
}

impl Dataset {
    /// Run order of a full ingest.
    pub const ALL: [Dataset; 8] = [
        Dataset::Confirmed,
        Dataset::Deaths,
        Dataset::Recovered,
        Dataset::NlHospitalized,
        Dataset::NlHospitalizedMunicipality,
        Dataset::NlDeaths,
        Dataset::NlCasesProvince,
        Dataset::Historical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Confirmed => "confirmed",
            Dataset::Deaths => "deaths",
            Dataset::Recovered => "recovered",
            Dataset::NlHospitalized => "nl-hospitalized",
            Dataset::NlHospitalizedMunicipality => "nl-hospitalized-municipality",
            Dataset::NlDeaths => "nl-deaths",
            Dataset::NlCasesProvince => "nl-cases-province",
            Dataset::Historical => "historical",
        }
    }

    pub fn url(self) -> String {
        match self {
            Dataset::Confirmed => format!("{CSSE_BASE}/time_series_covid19_confirmed_global.csv"),
            Dataset::Deaths => format!("{CSSE_BASE}/time_series_covid19_deaths_global.csv"),
            Dataset::Recovered => format!("{CSSE_BASE}/time_series_covid19_recovered_global.csv"),
            Dataset::NlHospitalized => format!("{CORONAWATCH_NL_BASE}/rivm_corona_in_nl_hosp.csv"),
            Dataset::NlHospitalizedMunicipality => {
                format!("{CORONAWATCH_NL_BASE}/rivm_NL_covid19_hosp_municipality.csv")
            }
            Dataset::NlDeaths => format!("{CORONAWATCH_NL_BASE}/rivm_corona_in_nl_fatalities.csv"),
            Dataset::NlCasesProvince => format!("{CORONAWATCH_NL_BASE}/rivm_NL_covid19_province.csv"),
            Dataset::Historical => "https://corona.lmao.ninja/v2/historical".to_string(),
        }
    }

    pub fn format(self) -> Format {
        match self {
            Dataset::Confirmed | Dataset::Deaths | Dataset::Recovered => Format::Wide,
            Dataset::NlHospitalized | Dataset::NlDeaths => Format::Aggregate,
            Dataset::NlHospitalizedMunicipality => Format::Municipality,
            Dataset::NlCasesProvince => Format::Province,
            Dataset::Historical => Format::Timeline,
        }
    }

    /// Decode a byte stream with this dataset's parser.
    pub fn parse<R: Read>(self, reader: R) -> Result<History, IngestError> {
        match self {
            Dataset::Confirmed => country(Metric::Confirmed, reader),
            Dataset::Deaths => country(Metric::Deaths, reader),
            Dataset::Recovered => country(Metric::Recovered, reader),
            Dataset::NlHospitalized => aggregate(Metric::Hospitalized, reader),
            Dataset::NlDeaths => aggregate(Metric::Deaths, reader),
            Dataset::NlHospitalizedMunicipality => {
                Ok(History::Municipality(io::parse_municipality_history(reader)?))
            }
            Dataset::NlCasesProvince => Ok(History::Province(io::parse_province_history(reader)?)),
            Dataset::Historical => Ok(History::Timelines(io::parse_timelines(reader)?)),
        }
    }
}

fn country<R: Read>(metric: Metric, reader: R) -> Result<History, IngestError> {
    Ok(History::Country {
        metric,
        history: io::parse_country_history(reader)?,
    })
}

fn aggregate<R: Read>(metric: Metric, reader: R) -> Result<History, IngestError> {
    Ok(History::Aggregate {
        metric,
        history: io::parse_aggregate_history(reader)?,
    })
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully parsed dataset, ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum History {
    Country {
        metric: Metric,
        history: ReportHistory<CountryReport>,
    },
    Aggregate {
        metric: Metric,
        history: AggregateHistory,
    },
    Municipality(ReportHistory<MunicipalityReport>),
    Province(ReportHistory<ProvinceReport>),
    Timelines(Vec<RegionTimeline>),
}

impl History {
    /// Number of dates (or regions, for timelines).
    pub fn len(&self) -> usize {
        match self {
            History::Country { history, .. } => history.len(),
            History::Aggregate { history, .. } => history.len(),
            History::Municipality(history) => history.len(),
            History::Province(history) => history.len(),
            History::Timelines(regions) => regions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_clap() {
        for dataset in Dataset::ALL {
            let parsed = Dataset::from_str(dataset.name(), false).unwrap();
            assert_eq!(parsed, dataset);
        }
    }

    #[test]
    fn every_dataset_has_a_distinct_url() {
        let mut urls: Vec<String> = Dataset::ALL.iter().map(|d| d.url()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), Dataset::ALL.len());
    }

    #[test]
    fn parse_dispatches_on_format() {
        let wide = "p,c,lat,long,1/22/20\n,Andorra,0,0,1\n";
        match Dataset::Recovered.parse(wide.as_bytes()).unwrap() {
            History::Country { metric, history } => {
                assert_eq!(metric, Metric::Recovered);
                assert_eq!(history.len(), 1);
            }
            other => panic!("unexpected history: {other:?}"),
        }

        let narrow = "Datum,Aantal\n2020-03-01,3\n";
        match Dataset::NlDeaths.parse(narrow.as_bytes()).unwrap() {
            History::Aggregate { metric, .. } => assert_eq!(metric, Metric::Deaths),
            other => panic!("unexpected history: {other:?}"),
        }

        let doc = r#"[{"country": "Andorra", "province": null, "timeline": {"cases": {}, "deaths": {}}}]"#;
        let history = Dataset::Historical.parse(doc.as_bytes()).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn province_dataset_writes_cases() {
        let narrow = "Datum,Provincienaam,Aantal\n2020-03-01,Utrecht,4\n";
        let history = match Dataset::NlCasesProvince.parse(narrow.as_bytes()).unwrap() {
            History::Province(history) => history,
            other => panic!("unexpected history: {other:?}"),
        };

        let points = crate::sink::points::province_points(&history);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fields.keys().collect::<Vec<_>>(), vec!["cases"]);
    }

    #[test]
    fn a_wide_file_is_not_a_narrow_file() {
        let wide = "p,c,lat,long,1/22/20\n,Andorra,0,0,1\n";
        assert!(Dataset::NlHospitalized.parse(wide.as_bytes()).is_err());
    }
}
