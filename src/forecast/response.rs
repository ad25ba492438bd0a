//! Response bodies served to the dashboard.

use crate::error::ForecastError;
use crate::model::ModelVariant;
use crate::risk::AlertLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Single-model forecast for one disease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast_id: Uuid,
    pub disease: String,
    pub model_type: ModelVariant,
    pub forecast_dates: Vec<NaiveDate>,
    pub predicted_cases: Vec<u64>,
    pub historical_dates: Vec<NaiveDate>,
    pub historical_cases: Vec<u64>,
    pub alert_level: AlertLevel,
    pub alert_message: String,
    pub last_updated: String,
}

/// LSTM and GRU forecasts side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub disease: String,
    pub forecast_dates: Vec<NaiveDate>,
    pub lstm_predictions: Vec<u64>,
    pub gru_predictions: Vec<u64>,
    pub historical_dates: Vec<NaiveDate>,
    pub historical_cases: Vec<u64>,
    pub comparison: ComparisonSummary,
    pub last_updated: String,
}

/// Differences between the two variants' inverted predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub avg_difference: f64,
    pub max_difference: f64,
    pub lstm_avg: f64,
    pub gru_avg: f64,
}

impl ComparisonSummary {
    pub fn between(lstm: &[f64], gru: &[f64]) -> Self {
        let diffs: Vec<f64> = lstm.iter().zip(gru).map(|(a, b)| (a - b).abs()).collect();
        Self {
            avg_difference: crate::risk::mean(&diffs),
            max_difference: diffs.iter().copied().fold(0.0, f64::max),
            lstm_avg: crate::risk::mean(lstm),
            gru_avg: crate::risk::mean(gru),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    /// Increasing only when the last value is strictly above the first.
    pub fn of(values: &[f64]) -> Self {
        match (values.first(), values.last()) {
            (Some(first), Some(last)) if last > first => Trend::Increasing,
            _ => Trend::Decreasing,
        }
    }
}

/// Latest observation and short-term trend for one disease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseStatus {
    pub disease: String,
    pub current_cases: u64,
    pub date: NaiveDate,
    pub trend: Trend,
}

/// Error body; the process keeps serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: String,
    pub status: u16,
}

impl From<&ForecastError> for FailureResponse {
    fn from(e: &ForecastError) -> Self {
        Self {
            error: e.to_string(),
            status: e.status(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceResponse<T> {
    Success(T),
    Failure(FailureResponse),
}

impl<T> ServiceResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResponse::Success(_))
    }

    pub fn status(&self) -> u16 {
        match self {
            ServiceResponse::Success(_) => 200,
            ServiceResponse::Failure(f) => f.status,
        }
    }
}

/// Serving boundary: every pipeline error becomes a failure body.
pub fn respond<T>(result: Result<T, ForecastError>) -> ServiceResponse<T> {
    match result {
        Ok(v) => ServiceResponse::Success(v),
        Err(e) => {
            tracing::warn!(error = %e, status = e.status(), "request failed");
            ServiceResponse::Failure(FailureResponse::from(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn comparison_summary_statistics() {
        let s = ComparisonSummary::between(&[10.0, 20.0, 30.0], &[12.0, 14.0, 30.0]);
        assert_eq!(s.max_difference, 6.0);
        assert!((s.avg_difference - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.lstm_avg, 20.0);
        assert!((s.gru_avg - 56.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn trend_compares_first_and_last() {
        assert_eq!(Trend::of(&[3.0, 9.0, 4.0]), Trend::Increasing);
        assert_eq!(Trend::of(&[4.0, 9.0, 4.0]), Trend::Decreasing);
        assert_eq!(Trend::of(&[]), Trend::Decreasing);
    }

    #[test]
    fn errors_become_failure_bodies() {
        let r: ServiceResponse<()> = respond(Err(ForecastError::DataNotFound {
            path: PathBuf::from("data/x.csv"),
        }));
        assert!(!r.is_success());
        assert_eq!(r.status(), 404);

        let r: ServiceResponse<()> = respond(Err(ForecastError::ModelUnavailable {
            disease: "Dengue".into(),
            variant: ModelVariant::Gru,
        }));
        assert_eq!(r.status(), 500);
        let body = serde_json::to_value(&r).unwrap();
        assert_eq!(body["error"], "Dengue GRU model not loaded");
    }
}
