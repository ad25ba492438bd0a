//! Sequence models: a window of scaled rows in, one scaled next-day case count out.

mod onnx;
mod registry;

pub use onnx::OnnxSequenceModel;
pub use registry::{model_path, ModelRegistry};

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("onnx runtime: {0}")]
    Runtime(#[from] ort::OrtError),

    #[error("window shape {actual:?} does not match model input {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("model produced no output")]
    EmptyOutput,

    #[error("unknown model variant {0:?}")]
    UnknownVariant(String),
}

/// Opaque forecasting capability. Implementations must be pure with respect
/// to the window: the same window always yields the same prediction.
pub trait SequenceModel: Send + Sync {
    /// Predict the scaled target for the day after the window's last row.
    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError>;
}

impl<F> SequenceModel for F
where
    F: Fn(ArrayView2<'_, f64>) -> f64 + Send + Sync,
{
    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError> {
        Ok(self(window))
    }
}

/// Recurrent architecture a model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelVariant {
    #[default]
    Lstm,
    Gru,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::Lstm, ModelVariant::Gru];

    /// Lower-case tag used in model file names.
    pub fn file_tag(self) -> &'static str {
        match self {
            ModelVariant::Lstm => "lstm",
            ModelVariant::Gru => "gru",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelVariant::Lstm => f.write_str("LSTM"),
            ModelVariant::Gru => f.write_str("GRU"),
        }
    }
}

impl FromStr for ModelVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lstm" => Ok(ModelVariant::Lstm),
            "gru" => Ok(ModelVariant::Gru),
            other => Err(ModelError::UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("lstm".parse::<ModelVariant>().unwrap(), ModelVariant::Lstm);
        assert_eq!(" GRU ".parse::<ModelVariant>().unwrap(), ModelVariant::Gru);
        assert!("transformer".parse::<ModelVariant>().is_err());
    }

    #[test]
    fn variant_display_and_serde_are_upper_case() {
        assert_eq!(ModelVariant::Gru.to_string(), "GRU");
        assert_eq!(serde_json::to_string(&ModelVariant::Lstm).unwrap(), "\"LSTM\"");
        assert_eq!(ModelVariant::Lstm.file_tag(), "lstm");
    }

    #[test]
    fn closures_are_sequence_models() {
        let last_target = |w: ArrayView2<'_, f64>| w[[w.nrows() - 1, w.ncols() - 1]];
        let w = Array2::from_shape_vec((2, 2), vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(last_target.predict(w.view()).unwrap(), 0.4);
    }
}
