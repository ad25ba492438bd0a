//! Request-scoped forecasting over the configured diseases.
//!
//! Every call reloads the CSV and refits the column statistics; only the
//! model registry is shared between requests, and it is read-only.

use super::engine::{run_forecast, Forecast};
use super::response::{
    ComparisonResponse, ComparisonSummary, DiseaseStatus, ForecastResponse, Trend,
};
use crate::analysis::{self, ClimateResponse, FeatureFactorsResponse, ModelEvaluation};
use crate::config::AppConfig;
use crate::data::{historical_data_path, load_table, FeatureTable};
use crate::error::{ForecastError, Result};
use crate::features::{prepare_inference, FeatureAssembler, ScaleInverter, SequenceWindower};
use crate::model::{ModelRegistry, ModelVariant, SequenceModel};
use crate::risk::{display_count, AlertPolicy};
use chrono::{Local, NaiveDate};
use ndarray::Array2;
use tracing::{debug, info, warn};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

struct Prepared {
    window: Array2<f64>,
    inverter: ScaleInverter,
    last_date: NaiveDate,
}

pub struct ForecastService<'r> {
    config: AppConfig,
    registry: &'r ModelRegistry,
    windower: SequenceWindower,
    policy: AlertPolicy,
}

impl<'r> ForecastService<'r> {
    pub fn new(config: AppConfig, registry: &'r ModelRegistry) -> Self {
        let windower = SequenceWindower::new(config.pipeline.sequence_length);
        let policy = AlertPolicy::new(config.alert.clone());
        Self {
            config,
            registry,
            windower,
            policy,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Configured spelling of `disease`, or `DataNotFound` for unknown diseases.
    fn resolve(&self, disease: &str) -> Result<String> {
        self.config
            .find_disease(disease)
            .map(str::to_string)
            .ok_or_else(|| ForecastError::DataNotFound {
                path: historical_data_path(&self.config.data_dir, disease),
            })
    }

    pub fn load(&self, disease: &str) -> Result<FeatureTable> {
        load_table(&historical_data_path(&self.config.data_dir, disease))
    }

    pub fn assembler(&self, disease: &str) -> FeatureAssembler {
        match self.config.feature_schema(disease) {
            Some(schema) => FeatureAssembler::with_schema(schema.iter().cloned()),
            None => FeatureAssembler::new(),
        }
    }

    fn history(&self, table: &FeatureTable) -> (Vec<NaiveDate>, Vec<f64>) {
        let n = self.config.pipeline.history_days;
        (table.tail_dates(n).to_vec(), table.tail_target(n).to_vec())
    }

    /// Assemble `table` with freshly fitted statistics and cut the trailing window.
    fn prepare(&self, disease: &str, table: &FeatureTable) -> Result<Prepared> {
        let input = prepare_inference(table, &self.assembler(disease), &self.windower)?;
        let last_date = table.last_date().ok_or(ForecastError::InsufficientHistory {
            available: 0,
            required: self.windower.window_len(),
        })?;
        debug!(
            %disease,
            rows = input.matrix.nrows(),
            columns = input.matrix.ncols(),
            "prepared trailing window"
        );
        Ok(Prepared {
            inverter: ScaleInverter::from_statistics(&input.statistics),
            window: input.trailing_window,
            last_date,
        })
    }

    fn run(&self, model: &dyn SequenceModel, prepared: &Prepared) -> Result<Forecast> {
        Ok(run_forecast(
            model,
            prepared.window.clone(),
            &prepared.inverter,
            prepared.last_date,
            self.config.pipeline.forecast_days,
        )?)
    }

    pub fn forecast(&self, disease: &str, variant: ModelVariant) -> Result<ForecastResponse> {
        let disease = self.resolve(disease)?;
        let model = self.registry.get(&disease, variant)?;
        let table = self.load(&disease)?;

        let prepared = self.prepare(&disease, &table)?;
        let forecast = self.run(model.as_ref(), &prepared)?;
        let (historical_dates, historical) = self.history(&table);
        let alert = self.policy.assess(&historical, &forecast.raw_cases);
        info!(
            %disease,
            %variant,
            alert_level = %alert.level,
            peak = alert.peak,
            historical_average = alert.historical_average,
            "forecast served"
        );

        Ok(ForecastResponse {
            forecast_id: Uuid::new_v4(),
            disease,
            model_type: variant,
            forecast_dates: forecast.dates(),
            predicted_cases: forecast.cases(),
            historical_dates,
            historical_cases: historical.iter().map(|&v| display_count(v)).collect(),
            alert_level: alert.level,
            alert_message: alert.message,
            last_updated: now_stamp(),
        })
    }

    pub fn compare_models(&self, disease: &str) -> Result<ComparisonResponse> {
        let disease = self.resolve(disease)?;
        let lstm_model = self.registry.get(&disease, ModelVariant::Lstm)?;
        let gru_model = self.registry.get(&disease, ModelVariant::Gru)?;
        let table = self.load(&disease)?;

        let prepared = self.prepare(&disease, &table)?;
        let lstm = self.run(lstm_model.as_ref(), &prepared)?;
        let gru = self.run(gru_model.as_ref(), &prepared)?;
        let comparison = ComparisonSummary::between(&lstm.raw_cases, &gru.raw_cases);
        let (historical_dates, historical) = self.history(&table);
        info!(%disease, avg_difference = comparison.avg_difference, "model comparison served");

        Ok(ComparisonResponse {
            disease,
            forecast_dates: lstm.dates(),
            lstm_predictions: lstm.cases(),
            gru_predictions: gru.cases(),
            historical_dates,
            historical_cases: historical.iter().map(|&v| display_count(v)).collect(),
            comparison,
            last_updated: now_stamp(),
        })
    }

    pub fn disease_status(&self, disease: &str) -> Result<DiseaseStatus> {
        let disease = self.resolve(disease)?;
        let table = self.load(&disease)?;
        let (date, cases) = table
            .last_date()
            .zip(table.target().last().copied())
            .ok_or(ForecastError::InsufficientHistory {
                available: 0,
                required: 1,
            })?;
        Ok(DiseaseStatus {
            trend: Trend::of(table.tail_target(self.config.pipeline.trend_days)),
            disease,
            current_cases: display_count(cases),
            date,
        })
    }

    /// Status of every disease with a loaded LSTM model. Failures are logged and skipped.
    pub fn current_status(&self) -> Vec<DiseaseStatus> {
        self.config
            .diseases
            .iter()
            .filter(|d| self.registry.contains(d, ModelVariant::Lstm))
            .filter_map(|d| match self.disease_status(d) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(disease = %d, error = %e, "status unavailable");
                    None
                }
            })
            .collect()
    }

    pub fn feature_factors(&self, disease: &str) -> Result<FeatureFactorsResponse> {
        let disease = self.resolve(disease)?;
        let table = self.load(&disease)?;
        Ok(analysis::feature_factors(&disease, &table))
    }

    pub fn climate_data(&self, disease: &str) -> Result<ClimateResponse> {
        let disease = self.resolve(disease)?;
        let table = self.load(&disease)?;
        Ok(analysis::climate_data(&table, self.config.pipeline.history_days))
    }

    /// Train/validation metrics of one variant on the disease's full history.
    pub fn evaluate_model(
        &self,
        disease: &str,
        variant: ModelVariant,
        validation_fraction: f64,
    ) -> Result<ModelEvaluation> {
        let disease = self.resolve(disease)?;
        let model = self.registry.get(&disease, variant)?;
        let table = self.load(&disease)?;
        let (matrix, _) = self.assembler(&disease).assemble(&table)?;
        let pairs = self.windower.training_pairs(&matrix);
        let (train, validation) = analysis::chronological_split(pairs, validation_fraction);
        let train = analysis::evaluate(model.as_ref(), &train)?;
        let validation = analysis::evaluate(model.as_ref(), &validation)?;
        info!(
            %disease,
            %variant,
            val_mae = validation.mae,
            val_r2 = validation.r2,
            "model evaluated"
        );
        Ok(ModelEvaluation {
            disease,
            model_type: variant,
            train,
            validation,
        })
    }
}
