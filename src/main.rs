//! HealthTrace entrypoint: answer one dashboard request on stdout, or refresh every
//! disease forecast once (or on an interval) and push them through the optional uplink.

use clap::{Parser, Subcommand};
use healthtrace::{
    config::AppConfig,
    forecast::{respond, ServiceResponse},
    logging::{LogEvent, StructuredLogger},
    model::{ModelRegistry, ModelVariant},
    uplink::ForecastPublisher,
    ForecastService,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// HealthTrace disease-outbreak forecasting
#[derive(Parser)]
#[command(name = "healthtrace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (default: $HEALTHTRACE_CONFIG_PATH or config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Forecast the next days of cases with one model variant
    Forecast {
        disease: String,
        /// lstm or gru
        #[arg(short, long, default_value = "lstm", value_parser = parse_variant)]
        model: ModelVariant,
    },
    /// Run both variants on the same window and compare them
    Compare { disease: String },
    /// Latest cases and trend for every disease with a loaded model
    Status,
    /// Covariate correlations with case counts, grouped by category
    Factors { disease: String },
    /// Recent climate series for a disease's region
    Climate { disease: String },
    /// Train/validation metrics of a model over the full history
    Evaluate {
        disease: String,
        #[arg(short, long, default_value = "lstm", value_parser = parse_variant)]
        model: ModelVariant,
        /// Trailing fraction of training pairs held out for validation
        #[arg(long, default_value_t = 0.2)]
        validation: f64,
    },
}

fn parse_variant(s: &str) -> Result<ModelVariant, String> {
    s.parse().map_err(|e: healthtrace::model::ModelError| e.to_string())
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn print_response<T: Serialize>(response: &ServiceResponse<T>) -> Result<bool, BoxError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, response)?;
    writeln!(out)?;
    Ok(response.is_success())
}

fn run_command(service: &ForecastService<'_>, command: Command) -> Result<bool, BoxError> {
    match command {
        Command::Forecast { disease, model } => {
            print_response(&respond(service.forecast(&disease, model)))
        }
        Command::Compare { disease } => {
            print_response(&respond(service.compare_models(&disease)))
        }
        Command::Status => print_response(&respond(Ok(service.current_status()))),
        Command::Factors { disease } => {
            print_response(&respond(service.feature_factors(&disease)))
        }
        Command::Climate { disease } => print_response(&respond(service.climate_data(&disease))),
        Command::Evaluate {
            disease,
            model,
            validation,
        } => print_response(&respond(service.evaluate_model(&disease, model, validation))),
    }
}

/// Forecast every configured disease with the default variant; one audit line each.
fn refresh_all(service: &ForecastService<'_>, uplink: Option<&ForecastPublisher>) {
    let mut out = std::io::stdout().lock();
    for disease in &service.config().diseases {
        let ts = chrono::Utc::now().to_rfc3339();
        match service.forecast(disease, ModelVariant::default()) {
            Ok(forecast) => {
                let model_type = forecast.model_type.to_string();
                let event = LogEvent {
                    ts,
                    level: "INFO",
                    target: "healthtrace::refresh",
                    message: "forecast refreshed",
                    disease: Some(&forecast.disease),
                    model_type: Some(&model_type),
                    alert_level: Some(forecast.alert_level.as_str()),
                    peak_cases: forecast.predicted_cases.iter().copied().max(),
                    error: None,
                };
                StructuredLogger::emit_json(&event, &mut out);
                if let Some(u) = uplink {
                    if let Err(e) = u.publish(&forecast) {
                        warn!(disease = %forecast.disease, error = %e, "uplink forecast failed");
                    }
                }
            }
            Err(e) => {
                let error = e.to_string();
                let event = LogEvent {
                    ts,
                    level: "WARN",
                    target: "healthtrace::refresh",
                    message: "forecast refresh failed",
                    disease: Some(disease),
                    model_type: None,
                    alert_level: None,
                    peak_cases: None,
                    error: Some(&error),
                };
                StructuredLogger::emit_json(&event, &mut out);
            }
        }
    }
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var_os("HEALTHTRACE_CONFIG_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let config = AppConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        data_dir = ?config.data_dir,
        model_dir = ?config.model_dir,
        "HealthTrace starting"
    );

    let registry = ModelRegistry::load(&config.model_dir, &config.diseases);
    if registry.is_empty() {
        warn!(model_dir = ?config.model_dir, "no models loaded; forecasts will fail");
    }
    let uplink = ForecastPublisher::new(&config.uplink);
    let interval_secs = config.uplink.refresh_interval_secs;
    let service = ForecastService::new(config, &registry);

    if let Some(command) = cli.command {
        if !run_command(&service, command)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    if interval_secs > 0 {
        info!(interval_secs, "refresh loop (Ctrl+C to stop)");
        static STOP: AtomicBool = AtomicBool::new(false);
        let _ = ctrlc::set_handler(|| {
            STOP.store(true, Ordering::Relaxed);
        });
        let mut cycle: u64 = 0;
        while !STOP.load(Ordering::Relaxed) {
            cycle += 1;
            info!(cycle, "refreshing forecasts");
            refresh_all(&service, uplink.as_ref());
            for _ in 0..interval_secs {
                if STOP.load(Ordering::Relaxed) {
                    break;
                }
                std::thread::sleep(Duration::from_secs(1));
            }
        }
        info!("HealthTrace stopping");
    } else {
        refresh_all(&service, uplink.as_ref());
        info!("HealthTrace refresh complete");
    }

    Ok(())
}
