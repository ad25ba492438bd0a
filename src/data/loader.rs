//! CSV → FeatureTable.

use super::{Covariate, FeatureTable, DATE_COLUMN, TARGET_COLUMN};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::debug;

const MISSING_MARKERS: [&str; 5] = ["", "na", "nan", "null", "none"];

/// Read a disease's history. Rows come back sorted by date.
pub fn load_table(path: &Path) -> Result<FeatureTable> {
    if !path.exists() {
        return Err(ForecastError::DataNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| ForecastError::MalformedData(format!("missing column {}", DATE_COLUMN)))?;
    let target_idx = headers
        .iter()
        .position(|h| h == TARGET_COLUMN)
        .ok_or_else(|| ForecastError::MalformedData(format!("missing column {}", TARGET_COLUMN)))?;

    let mut covariates: Vec<(usize, Covariate)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx && *i != target_idx)
        .map(|(i, name)| {
            (
                i,
                Covariate {
                    name: name.to_string(),
                    values: Vec::new(),
                },
            )
        })
        .collect();
    let mut dates = Vec::new();
    let mut target = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row + 2;

        let raw_date = record.get(date_idx).unwrap_or_default();
        dates.push(parse_date(raw_date).ok_or_else(|| {
            ForecastError::MalformedData(format!("line {}: unparseable date {:?}", line, raw_date))
        })?);

        let raw_cases = record.get(target_idx).unwrap_or_default();
        let cases = parse_cell(raw_cases)
            .ok()
            .flatten()
            .ok_or_else(|| {
                ForecastError::MalformedData(format!(
                    "line {}: unparseable {} {:?}",
                    line, TARGET_COLUMN, raw_cases
                ))
            })?;
        target.push(cases);

        for (idx, col) in covariates.iter_mut() {
            let raw = record.get(*idx).unwrap_or_default();
            let v = parse_cell(raw).map_err(|_| {
                ForecastError::MalformedData(format!(
                    "line {}: unparseable {} {:?}",
                    line, col.name, raw
                ))
            })?;
            col.values.push(v);
        }
    }

    debug!(
        path = %path.display(),
        rows = dates.len(),
        covariates = covariates.len(),
        "loaded feature table"
    );

    FeatureTable::from_columns(
        dates,
        covariates.into_iter().map(|(_, c)| c).collect(),
        target,
    )
}

/// `Ok(None)` for a missing cell, `Err` for text that is not a number.
fn parse_cell(raw: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    if MISSING_MARKERS.contains(&raw.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    let v: f64 = raw.parse()?;
    Ok(v.is_finite().then_some(v))
}

/// ISO date, or the date part of an ISO timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_file_is_data_not_found() {
        let err = load_table(Path::new("no/such/dengue_historical_data.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::DataNotFound { .. }));
    }

    #[test]
    fn missing_target_column_is_malformed() {
        let f = write_csv("date,tave\n2024-01-01,27.5\n");
        let err = load_table(f.path()).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedData(_)));
    }

    #[test]
    fn loads_and_sorts_out_of_order_rows() {
        let f = write_csv(
            "date,tave,disease_cases,pm25\n\
             2024-01-03,28.0,7,\n\
             2024-01-01,27.0,5,12.5\n\
             2024-01-02,NaN,6,11.0\n",
        );
        let t = load_table(f.path()).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.covariate_names(), vec!["tave", "pm25"]);
        assert_eq!(t.target(), &[5.0, 6.0, 7.0]);
        assert_eq!(t.covariate("tave").unwrap(), &[Some(27.0), None, Some(28.0)]);
        assert_eq!(t.covariate("pm25").unwrap(), &[Some(12.5), Some(11.0), None]);
    }

    #[test]
    fn unparseable_target_is_malformed() {
        let f = write_csv("date,tave,disease_cases\n2024-01-01,27.0,\n");
        assert!(matches!(
            load_table(f.path()).unwrap_err(),
            ForecastError::MalformedData(_)
        ));
    }

    #[test]
    fn text_in_covariate_is_malformed() {
        let f = write_csv("date,tave,disease_cases\n2024-01-01,hot,3\n");
        assert!(matches!(
            load_table(f.path()).unwrap_err(),
            ForecastError::MalformedData(_)
        ));
    }

    #[test]
    fn parses_timestamp_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("2024-03-09 00:00:00"), expected);
        assert_eq!(parse_date("2024-03-09T12:00:00+08:00"), expected);
        assert_eq!(parse_date("09/03/2024"), None);
    }
}
