//! Hold-out evaluation of a sequence model on windowed history.

use crate::error::{ForecastError, Result};
use crate::features::Sequence;
use crate::model::{ModelVariant, SequenceModel};
use serde::{Deserialize, Serialize};

/// Error metrics in scaled target units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub disease: String,
    pub model_type: ModelVariant,
    pub train: EvaluationMetrics,
    pub validation: EvaluationMetrics,
}

/// Split without shuffling: the validation set is the last
/// `ceil(n * validation_fraction)` pairs.
pub fn chronological_split(
    mut pairs: Vec<Sequence>,
    validation_fraction: f64,
) -> (Vec<Sequence>, Vec<Sequence>) {
    let f = validation_fraction.clamp(0.0, 1.0);
    let n_val = (pairs.len() as f64 * f).ceil() as usize;
    let validation = pairs.split_off(pairs.len() - n_val.min(pairs.len()));
    (pairs, validation)
}

/// Score `model` on `pairs`. R² is 0 when the targets have no variance.
pub fn evaluate(model: &dyn SequenceModel, pairs: &[Sequence]) -> Result<EvaluationMetrics> {
    if pairs.is_empty() {
        return Err(ForecastError::InsufficientHistory {
            available: 0,
            required: 1,
        });
    }
    let mut predictions = Vec::with_capacity(pairs.len());
    for p in pairs {
        predictions.push(model.predict(p.window.view())?);
    }
    let targets: Vec<f64> = pairs.iter().map(|p| p.target).collect();
    Ok(metrics(&targets, &predictions))
}

pub fn metrics(targets: &[f64], predictions: &[f64]) -> EvaluationMetrics {
    let n = targets.len().max(1) as f64;
    let mean = targets.iter().sum::<f64>() / n;
    let (mut abs, mut ss_res, mut ss_tot) = (0.0, 0.0, 0.0);
    for (t, p) in targets.iter().zip(predictions) {
        abs += (t - p).abs();
        ss_res += (t - p).powi(2);
        ss_tot += (t - mean).powi(2);
    }
    EvaluationMetrics {
        mae: abs / n,
        rmse: (ss_res / n).sqrt(),
        r2: if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot },
        samples: targets.len(),
    }
}
