//! Recent climate series for the dashboard, mapped from whatever columns a CSV carries.

use crate::data::FeatureTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Humidity shown when the table has no humidity column.
pub const HUMIDITY_PLACEHOLDER: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateResponse {
    pub dates: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Vec<f64>>,
    pub humidity: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_7day: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_30day: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spi3: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_anomaly: Option<Vec<f64>>,
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

/// Last `days` rows of the first column in `candidates` that exists, missing as 0.
fn series(table: &FeatureTable, days: usize, candidates: &[&str], decimals: i32) -> Option<Vec<f64>> {
    let start = table.tail_start(days);
    candidates.iter().find_map(|name| {
        table.covariate(name).map(|col| {
            col[start..]
                .iter()
                .map(|v| round_to(v.unwrap_or(0.0), decimals))
                .collect()
        })
    })
}

pub fn climate_data(table: &FeatureTable, days: usize) -> ClimateResponse {
    let dates = table.tail_dates(days).to_vec();
    let humidity = series(table, days, &["humidity"], 1)
        .unwrap_or_else(|| vec![HUMIDITY_PLACEHOLDER; dates.len()]);
    ClimateResponse {
        temperature: series(table, days, &["tave", "temperature"], 1),
        humidity,
        rainfall: series(table, days, &["precipitation", "pr", "rainfall"], 1),
        precipitation: series(table, days, &["precipitation"], 2),
        precipitation_7day: series(table, days, &["precipitation_7day"], 2),
        precipitation_30day: series(table, days, &["precipitation_30day"], 2),
        spi3: series(table, days, &["spi3"], 2),
        precip_anomaly: series(table, days, &["precip_anomaly"], 2),
        dates,
    }
}
