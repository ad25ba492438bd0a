//! ONNX Runtime inference for exported LSTM/GRU forecasters.
//! Input: [1, L, columns] f32. Output: first element of the first tensor.

use super::{ModelError, SequenceModel};
use ndarray::{ArrayView2, Axis, CowArray};
use ort::tensor::OrtOwnedTensor;
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn init_env() -> Result<Arc<Environment>, ModelError> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env.clone());
    }
    let env = Environment::builder()
        .with_name("healthtrace")
        .build()?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env).clone())
}

pub struct OnnxSequenceModel {
    session: Session,
    /// (L, columns) when the exported graph declares fixed dimensions.
    input_shape: Option<(usize, usize)>,
}

impl OnnxSequenceModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let env = init_env()?;
        let session = SessionBuilder::new(&env)?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .with_intra_threads(1)?
            .with_model_from_file(path)?;

        let input_shape = session.inputs.first().and_then(|input| {
            match input.dimensions.as_slice() {
                [_, Some(l), Some(c)] => Some((*l as usize, *c as usize)),
                _ => None,
            }
        });
        tracing::debug!(path = %path.display(), ?input_shape, "onnx model loaded");

        Ok(Self {
            session,
            input_shape,
        })
    }

    pub fn input_shape(&self) -> Option<(usize, usize)> {
        self.input_shape
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError> {
        if let Some(expected) = self.input_shape {
            if expected != window.dim() {
                return Err(ModelError::ShapeMismatch {
                    expected,
                    actual: window.dim(),
                });
            }
        }

        let batch = window.mapv(|v| v as f32).insert_axis(Axis(0)).into_dyn();
        let batch = CowArray::from(batch);
        let input = Value::from_array(self.session.allocator(), &batch)?;
        let outputs = self.session.run(vec![input])?;

        let first = outputs.first().ok_or(ModelError::EmptyOutput)?;
        let tensor: OrtOwnedTensor<f32, _> = first.try_extract()?;
        let value = tensor
            .view()
            .iter()
            .next()
            .copied()
            .ok_or(ModelError::EmptyOutput)?;
        Ok(f64::from(value))
    }
}
