//! Error kinds shared by the pipeline and the serving boundary.

use crate::model::{ModelError, ModelVariant};
use std::path::PathBuf;

/// Failure of any pipeline stage (load → assemble → window → infer → invert).
///
/// Stages return these unmodified; only the serving boundary turns them into
/// a failure response.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("historical data not found: {}", path.display())]
    DataNotFound { path: PathBuf },

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("insufficient features: {found} usable covariate columns")]
    InsufficientFeatures { found: usize },

    #[error("insufficient history: {available} rows available, {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("{disease} {variant} model not loaded")]
    ModelUnavailable { disease: String, variant: ModelVariant },

    #[error("model inference failed: {0}")]
    Model(#[from] ModelError),
}

impl ForecastError {
    /// HTTP-style status used by failure responses.
    pub fn status(&self) -> u16 {
        match self {
            ForecastError::DataNotFound { .. } => 404,
            _ => 500,
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(e: csv::Error) -> Self {
        ForecastError::MalformedData(e.to_string())
    }
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
