//! Service configuration: where data and models live, pipeline sizes, alert ratios.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `<disease>_historical_data.csv`
    pub data_dir: PathBuf,
    /// Directory holding `<disease>_forecast_<variant>.onnx`
    pub model_dir: PathBuf,
    /// Diseases served, in display order
    pub diseases: Vec<String>,
    /// Covariate columns a disease's models were trained on, in order.
    /// Diseases without an entry use every covariate in their CSV.
    pub feature_schemas: BTreeMap<String, Vec<String>>,
    /// Window and horizon sizes
    pub pipeline: PipelineConfig,
    /// Alert tier ratios
    pub alert: AlertConfig,
    /// Optional push of forecasts to the dashboard backend
    pub uplink: UplinkConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Days per model input window (L)
    pub sequence_length: usize,
    /// Days forecast ahead (H)
    pub forecast_days: usize,
    /// Trailing days returned as context and averaged for alerts
    pub history_days: usize,
    /// Trailing days compared for the status trend
    pub trend_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Peak/average ratio above which the alert is MEDIUM
    pub medium_ratio: f64,
    /// Peak/average ratio above which the alert is HIGH
    pub high_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UplinkConfig {
    pub enabled: bool,
    /// Dashboard backend base URL when enabled
    pub endpoint: Option<String>,
    /// Seconds between forecast refreshes; 0 runs once
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            model_dir: PathBuf::from("models"),
            diseases: vec![
                "Dengue".to_string(),
                "Typhoid".to_string(),
                "Leptospirosis".to_string(),
            ],
            feature_schemas: BTreeMap::new(),
            pipeline: PipelineConfig::default(),
            alert: AlertConfig::default(),
            uplink: UplinkConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sequence_length: 30,
            forecast_days: 7,
            history_days: 30,
            trend_days: 7,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            medium_ratio: 1.5,
            high_ratio: 2.0,
        }
    }
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            refresh_interval_secs: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl AppConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<AppConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Configured name matching `disease` case-insensitively.
    pub fn find_disease(&self, disease: &str) -> Option<&str> {
        self.diseases
            .iter()
            .find(|d| d.eq_ignore_ascii_case(disease))
            .map(String::as_str)
    }

    pub fn feature_schema(&self, disease: &str) -> Option<&[String]> {
        self.feature_schemas
            .iter()
            .find(|(d, _)| d.eq_ignore_ascii_case(disease))
            .map(|(_, cols)| cols.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let c: AppConfig =
            serde_json::from_str(r#"{"pipeline":{"forecast_days":14},"diseases":["Dengue"]}"#).unwrap();
        assert_eq!(c.pipeline.forecast_days, 14);
        assert_eq!(c.pipeline.sequence_length, 30);
        assert_eq!(c.diseases, vec!["Dengue"]);
        assert_eq!(c.alert.high_ratio, 2.0);
    }

    #[test]
    fn finds_disease_ignoring_case() {
        let c = AppConfig::default();
        assert_eq!(c.find_disease("dengue"), Some("Dengue"));
        assert_eq!(c.find_disease("cholera"), None);
    }

    #[test]
    fn feature_schema_lookup() {
        let c: AppConfig =
            serde_json::from_str(r#"{"feature_schemas":{"Dengue":["tave","pm25"]}}"#).unwrap();
        assert_eq!(c.feature_schema("DENGUE").unwrap(), ["tave", "pm25"]);
        assert!(c.feature_schema("Typhoid").is_none());
    }
}
