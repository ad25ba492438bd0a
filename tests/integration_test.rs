//! Integration test: CSV on disk → service → forecast, comparison, status, analytics.

use chrono::NaiveDate;
use healthtrace::{
    config::AppConfig,
    error::ForecastError,
    forecast::{respond, ForecastService, Trend},
    model::{ModelRegistry, ModelVariant, SequenceModel},
    risk::AlertLevel,
};
use ndarray::ArrayView2;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

fn constant(v: f64) -> Arc<dyn SequenceModel> {
    Arc::new(move |_: ArrayView2<'_, f64>| v)
}

/// `rows` days from 2024-01-01 with cases 100, 101, ...
fn write_history(dir: &Path, disease: &str, rows: usize) {
    let path = dir.join(format!("{}_historical_data.csv", disease.to_lowercase()));
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, "date,tave,precipitation,pm25,disease_cases").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for i in 0..rows {
        let date = start + chrono::Duration::days(i as i64);
        let pm25 = if i % 7 == 3 { String::new() } else { format!("{}", 10 + i % 4) };
        writeln!(
            f,
            "{},{},{},{},{}",
            date,
            25 + i % 5,
            i as f64 * 0.5,
            pm25,
            100 + i
        )
        .unwrap();
    }
}

fn config(data_dir: &Path) -> AppConfig {
    let mut c = AppConfig::default();
    c.data_dir = data_dir.to_path_buf();
    c.model_dir = data_dir.join("models");
    c.pipeline.sequence_length = 30;
    c.pipeline.forecast_days = 5;
    c
}

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[test]
fn config_load_default() {
    let c = AppConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.pipeline.sequence_length, 30);
    assert_eq!(c.pipeline.forecast_days, 7);
    assert!(!c.uplink.enabled);
    assert_eq!(c.diseases.len(), 3);
}

#[test]
fn forecast_dates_follow_history_and_counts_are_inverted() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::from_models([("Dengue", ModelVariant::Lstm, constant(0.5))]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let r = service.forecast("dengue", ModelVariant::Lstm).unwrap();
    assert_eq!(r.disease, "Dengue");
    assert_eq!(r.model_type, ModelVariant::Lstm);
    // last observation is 2024-02-09
    assert_eq!(
        r.forecast_dates,
        vec![day(2, 10), day(2, 11), day(2, 12), day(2, 13), day(2, 14)]
    );
    // 100 + 0.5 * (139 - 100) = 119.5
    assert_eq!(r.predicted_cases, vec![120; 5]);
    assert_eq!(r.historical_cases.len(), 30);
    assert_eq!(r.historical_cases.last(), Some(&139));
    assert_eq!(r.historical_dates.last(), Some(&day(2, 9)));
    assert_eq!(r.alert_level, AlertLevel::Low);
}

#[test]
fn alert_tiers_follow_inverted_peak() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    // trailing average 124.5: MEDIUM above 186.75, HIGH above 249
    let registry = ModelRegistry::from_models([
        ("Dengue", ModelVariant::Lstm, constant(3.0)),
        ("Dengue", ModelVariant::Gru, constant(5.0)),
    ]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let medium = service.forecast("Dengue", ModelVariant::Lstm).unwrap();
    assert_eq!(medium.alert_level, AlertLevel::Medium);
    assert_eq!(medium.predicted_cases[0], 217);

    let high = service.forecast("Dengue", ModelVariant::Gru).unwrap();
    assert_eq!(high.alert_level, AlertLevel::High);
    assert!(high.alert_message.contains("295"));
}

#[test]
fn negative_predictions_display_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::from_models([("Dengue", ModelVariant::Lstm, constant(-5.0))]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let r = service.forecast("Dengue", ModelVariant::Lstm).unwrap();
    assert_eq!(r.predicted_cases, vec![0; 5]);
    assert_eq!(r.alert_level, AlertLevel::Low);
}

#[test]
fn schema_columns_shape_the_model_input() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let shaped: Arc<dyn SequenceModel> = Arc::new(|w: ArrayView2<'_, f64>| {
        // tave, humidity (absent, filled), precipitation, disease_cases
        assert_eq!(w.dim(), (30, 4));
        assert!(w.column(1).iter().all(|&v| v == 0.0));
        0.5
    });
    let registry = ModelRegistry::from_models([("Dengue", ModelVariant::Lstm, shaped)]);
    let mut cfg = config(dir.path());
    cfg.feature_schemas.insert(
        "Dengue".into(),
        vec!["tave".into(), "humidity".into(), "precipitation".into()],
    );
    let service = ForecastService::new(cfg, &registry);
    assert!(service.forecast("Dengue", ModelVariant::Lstm).is_ok());
}

#[test]
fn missing_model_and_data_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::from_models([
        ("Dengue", ModelVariant::Lstm, constant(0.5)),
        ("Typhoid", ModelVariant::Lstm, constant(0.5)),
    ]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let err = service.forecast("Dengue", ModelVariant::Gru).unwrap_err();
    assert!(matches!(err, ForecastError::ModelUnavailable { variant: ModelVariant::Gru, .. }));

    let err = service.forecast("Typhoid", ModelVariant::Lstm).unwrap_err();
    assert!(matches!(err, ForecastError::DataNotFound { .. }));
    assert_eq!(err.status(), 404);

    let body = respond(service.forecast("Malaria", ModelVariant::Lstm));
    assert!(!body.is_success());
    assert_eq!(body.status(), 404);
}

#[test]
fn short_history_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 10);
    let registry = ModelRegistry::from_models([("Dengue", ModelVariant::Lstm, constant(0.5))]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let err = service.forecast("Dengue", ModelVariant::Lstm).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientHistory {
            available: 10,
            required: 30
        }
    ));
}

#[test]
fn comparison_runs_both_variants_on_one_window() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::from_models([
        ("Dengue", ModelVariant::Lstm, constant(0.5)),
        ("Dengue", ModelVariant::Gru, constant(0.25)),
    ]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let c = service.compare_models("Dengue").unwrap();
    assert_eq!(c.forecast_dates.len(), 5);
    assert_eq!(c.lstm_predictions, vec![120; 5]);
    assert_eq!(c.gru_predictions, vec![110; 5]);
    assert!((c.comparison.avg_difference - 9.75).abs() < 1e-9);
    assert!((c.comparison.max_difference - 9.75).abs() < 1e-9);
}

#[test]
fn current_status_lists_diseases_with_lstm_models() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::from_models([
        ("Dengue", ModelVariant::Lstm, constant(0.5)),
        // no data file: skipped
        ("Typhoid", ModelVariant::Lstm, constant(0.5)),
        // GRU only: not listed
        ("Leptospirosis", ModelVariant::Gru, constant(0.5)),
    ]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let status = service.current_status();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].disease, "Dengue");
    assert_eq!(status[0].current_cases, 139);
    assert_eq!(status[0].date, day(2, 9));
    assert_eq!(status[0].trend, Trend::Increasing);
}

#[test]
fn analytics_read_the_same_history() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    let registry = ModelRegistry::default();
    let service = ForecastService::new(config(dir.path()), &registry);

    let factors = service.feature_factors("Dengue").unwrap();
    let climate = factors
        .categories
        .iter()
        .find(|c| c.name == "Climate & Precipitation")
        .unwrap();
    // precipitation and cases are both linear in the day index
    assert!((climate.features[0].impact - 1.0).abs() < 1e-9);

    let series = service.climate_data("Dengue").unwrap();
    assert_eq!(series.dates.len(), 30);
    assert_eq!(series.temperature.as_ref().map(Vec::len), Some(30));
    assert_eq!(series.rainfall.as_ref().and_then(|r| r.last().copied()), Some(19.5));

    assert!(matches!(
        service.feature_factors("Typhoid").unwrap_err(),
        ForecastError::DataNotFound { .. }
    ));
}

#[test]
fn evaluation_holds_out_the_latest_pairs() {
    let dir = tempfile::tempdir().unwrap();
    write_history(dir.path(), "Dengue", 40);
    // echo the last scaled target
    let persistence: Arc<dyn SequenceModel> =
        Arc::new(|w: ArrayView2<'_, f64>| w[[w.nrows() - 1, w.ncols() - 1]]);
    let registry = ModelRegistry::from_models([("Dengue", ModelVariant::Lstm, persistence)]);
    let service = ForecastService::new(config(dir.path()), &registry);

    let e = service.evaluate_model("Dengue", ModelVariant::Lstm, 0.2).unwrap();
    assert_eq!(e.train.samples, 8);
    assert_eq!(e.validation.samples, 2);
    // cases step by one per day: scaled step is 1/39
    assert!((e.validation.mae - 1.0 / 39.0).abs() < 1e-9);
}

#[test]
fn registry_load_skips_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(dir.path(), &["Dengue".to_string()]);
    assert!(registry.is_empty());
}
