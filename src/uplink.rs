//! Uplink client: push served forecasts and elevated alerts to the dashboard backend.

use crate::config::UplinkConfig;
use crate::forecast::ForecastResponse;
use crate::risk::AlertLevel;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Serialize)]
struct ForecastPayload<'a> {
    id: String,
    disease: &'a str,
    model_type: String,
    issued_at: String,
    forecast: Vec<ForecastDay>,
}

#[derive(Serialize)]
struct ForecastDay {
    date: NaiveDate,
    cases: u64,
}

#[derive(Serialize)]
struct AlertPayload<'a> {
    id: String,
    disease: &'a str,
    level: AlertLevel,
    message: &'a str,
    window_start: Option<NaiveDate>,
    window_end: Option<NaiveDate>,
    source: String,
}

pub struct ForecastPublisher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ForecastPublisher {
    /// `None` when uplink is disabled, has no endpoint, or the client cannot be built.
    pub fn new(config: &UplinkConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let endpoint = config.endpoint.as_ref()?.trim_end_matches('/');
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .ok()?;
        Some(Self {
            client,
            base_url: endpoint.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), String> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(format!("{} {}", status, text));
        }
        Ok(())
    }

    /// Post the forecast, then the alert when it is above LOW.
    pub fn publish(&self, forecast: &ForecastResponse) -> Result<(), String> {
        let payload = ForecastPayload {
            id: forecast.forecast_id.to_string(),
            disease: &forecast.disease,
            model_type: forecast.model_type.to_string(),
            issued_at: Utc::now().to_rfc3339(),
            forecast: forecast
                .forecast_dates
                .iter()
                .zip(&forecast.predicted_cases)
                .map(|(&date, &cases)| ForecastDay { date, cases })
                .collect(),
        };
        self.post("/api/v1/forecasts", &payload)?;

        if forecast.alert_level > AlertLevel::Low {
            let alert = AlertPayload {
                id: format!("alert_{}", forecast.forecast_id),
                disease: &forecast.disease,
                level: forecast.alert_level,
                message: &forecast.alert_message,
                window_start: forecast.forecast_dates.first().copied(),
                window_end: forecast.forecast_dates.last().copied(),
                source: format!("healthtrace/{}", forecast.model_type),
            };
            if let Err(e) = self.post("/api/v1/alerts", &alert) {
                warn!(disease = %forecast.disease, error = %e, "uplink alert failed");
            }
        }
        info!(
            disease = %forecast.disease,
            level = %forecast.alert_level,
            "uplink forecast published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_or_endpointless_uplink_is_none() {
        assert!(ForecastPublisher::new(&UplinkConfig::default()).is_none());
        let cfg = UplinkConfig {
            enabled: true,
            endpoint: None,
            refresh_interval_secs: 0,
        };
        assert!(ForecastPublisher::new(&cfg).is_none());
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let cfg = UplinkConfig {
            enabled: true,
            endpoint: Some("http://localhost:5000/".into()),
            refresh_interval_secs: 0,
        };
        let p = ForecastPublisher::new(&cfg).unwrap();
        assert_eq!(p.base_url(), "http://localhost:5000");
    }
}
