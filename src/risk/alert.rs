//! Compares the forecast peak with the recent historical average; produces an alert tier.

use crate::config::AlertConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
}

impl AlertLevel {
    /// `peak > high_ratio * avg` is HIGH, `peak > medium_ratio * avg` is MEDIUM,
    /// anything else LOW. Both comparisons are strict.
    pub fn classify(historical_average: f64, peak: f64, config: &AlertConfig) -> Self {
        if peak > historical_average * config.high_ratio {
            AlertLevel::High
        } else if peak > historical_average * config.medium_ratio {
            AlertLevel::Medium
        } else {
            AlertLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
        }
    }

    /// Human-readable message for a peak of `peak_cases`.
    pub fn message(self, peak_cases: u64) -> String {
        match self {
            AlertLevel::High => format!(
                "High outbreak risk detected! Predicted cases may reach {} cases.",
                peak_cases
            ),
            AlertLevel::Medium => format!(
                "Moderate outbreak risk. Predicted cases may reach {} cases.",
                peak_cases
            ),
            AlertLevel::Low => format!(
                "Low outbreak risk. Cases expected to remain around {} cases.",
                peak_cases
            ),
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert for one forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub historical_average: f64,
    pub peak: f64,
}

pub struct AlertPolicy {
    config: AlertConfig,
}

impl AlertPolicy {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// `historical` is the trailing case history, `predictions` the inverted
    /// (unclamped) forecast. An empty history averages to 0.
    pub fn assess(&self, historical: &[f64], predictions: &[f64]) -> Alert {
        let historical_average = mean(historical);
        let peak = predictions
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0);
        let level = AlertLevel::classify(historical_average, peak, &self.config);
        Alert {
            level,
            message: level.message(display_count(peak)),
            historical_average,
            peak,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

/// Case count as shown to users: clamped at zero, rounded to nearest.
pub fn display_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(avg: f64, peak: f64) -> AlertLevel {
        AlertLevel::classify(avg, peak, &AlertConfig::default())
    }

    #[test]
    fn tiers_follow_peak_to_average_ratio() {
        assert_eq!(level(100.0, 145.0), AlertLevel::Low);
        assert_eq!(level(100.0, 175.0), AlertLevel::Medium);
        assert_eq!(level(100.0, 250.0), AlertLevel::High);
    }

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(level(100.0, 150.0), AlertLevel::Low);
        assert_eq!(level(100.0, 200.0), AlertLevel::Medium);
        assert_eq!(level(100.0, 200.5), AlertLevel::High);
    }

    #[test]
    fn zero_history_with_any_cases_is_high() {
        assert_eq!(level(0.0, 1.0), AlertLevel::High);
        assert_eq!(level(0.0, 0.0), AlertLevel::Low);
    }

    #[test]
    fn assess_reports_peak_and_message() {
        let policy = AlertPolicy::new(AlertConfig::default());
        let alert = policy.assess(&[90.0, 110.0], &[120.0, 249.6, 180.0]);
        assert_eq!(alert.level, AlertLevel::High);
        assert_eq!(alert.historical_average, 100.0);
        assert_eq!(alert.peak, 249.6);
        assert_eq!(
            alert.message,
            "High outbreak risk detected! Predicted cases may reach 250 cases."
        );
    }

    #[test]
    fn display_count_clamps_and_rounds() {
        assert_eq!(display_count(-3.2), 0);
        assert_eq!(display_count(f64::NAN), 0);
        assert_eq!(display_count(4.5), 5);
        assert_eq!(display_count(4.49), 4);
    }
}
