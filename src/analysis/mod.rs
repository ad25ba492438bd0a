//! Dashboard analytics over a feature table: correlations, climate series, model evaluation.

mod climate;
mod correlation;
mod evaluation;

pub use climate::{climate_data, ClimateResponse, HUMIDITY_PLACEHOLDER};
pub use correlation::{
    display_name, feature_factors, pearson, FactorCategory, FeatureFactor, FeatureFactorsResponse,
};
pub use evaluation::{chronological_split, evaluate, metrics, EvaluationMetrics, ModelEvaluation};
