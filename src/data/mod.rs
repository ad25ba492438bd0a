//! Historical feature tables: one row per day, a date, a case count and covariates.

mod loader;

pub use loader::{load_table, parse_date};

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub const DATE_COLUMN: &str = "date";
pub const TARGET_COLUMN: &str = "disease_cases";

/// `<data_dir>/<disease>_historical_data.csv`, disease lower-cased.
pub fn historical_data_path(data_dir: &Path, disease: &str) -> PathBuf {
    data_dir.join(format!("{}_historical_data.csv", disease.to_lowercase()))
}

/// One named covariate column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariate {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Time-ordered table of a disease's history, stored column-wise.
///
/// Dates are strictly ascending; every column has one entry per date.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    dates: Vec<NaiveDate>,
    covariates: Vec<Covariate>,
    target: Vec<f64>,
}

impl FeatureTable {
    /// Build a table from unsorted columns. Rows are stably sorted by date;
    /// duplicate dates, ragged columns and negative or non-finite case counts
    /// are rejected.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        covariates: Vec<Covariate>,
        target: Vec<f64>,
    ) -> Result<Self> {
        let n = dates.len();
        if target.len() != n {
            return Err(ForecastError::MalformedData(format!(
                "{} has {} values for {} dates",
                TARGET_COLUMN,
                target.len(),
                n
            )));
        }
        if let Some(c) = covariates.iter().find(|c| c.values.len() != n) {
            return Err(ForecastError::MalformedData(format!(
                "column {} has {} values for {} dates",
                c.name,
                c.values.len(),
                n
            )));
        }
        if let Some((i, v)) = target.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(ForecastError::MalformedData(format!(
                "{} on {} is not a non-negative count: {}",
                TARGET_COLUMN, dates[i], v
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| dates[i]);
        if let Some(w) = order.windows(2).find(|w| dates[w[0]] == dates[w[1]]) {
            return Err(ForecastError::MalformedData(format!(
                "duplicate date {}",
                dates[w[0]]
            )));
        }

        let dates = order.iter().map(|&i| dates[i]).collect();
        let target = order.iter().map(|&i| target[i]).collect();
        let covariates = covariates
            .into_iter()
            .map(|c| Covariate {
                values: order.iter().map(|&i| c.values[i]).collect(),
                name: c.name,
            })
            .collect();

        Ok(Self {
            dates,
            covariates,
            target,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Case counts, chronological.
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn covariates(&self) -> &[Covariate] {
        &self.covariates
    }

    /// Covariate names in source column order.
    pub fn covariate_names(&self) -> Vec<&str> {
        self.covariates.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn covariate(&self, name: &str) -> Option<&[Option<f64>]> {
        self.covariates
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of the first of the trailing `n` rows.
    pub fn tail_start(&self, n: usize) -> usize {
        self.len().saturating_sub(n)
    }

    pub fn tail_dates(&self, n: usize) -> &[NaiveDate] {
        &self.dates[self.tail_start(n)..]
    }

    pub fn tail_target(&self, n: usize) -> &[f64] {
        &self.target[self.tail_start(n)..]
    }
}
