//! Forecast serving: iterative multi-step prediction, dating, alerting, responses.

mod engine;
mod response;
mod service;

pub use engine::{forecast_dates, forecast_scaled, run_forecast, Forecast, ForecastPoint, RollingWindow};
pub use response::{
    respond, ComparisonResponse, ComparisonSummary, DiseaseStatus, FailureResponse,
    ForecastResponse, ServiceResponse, Trend,
};
pub use service::ForecastService;
