//! Immutable (disease, variant) → model map, built once at startup.

use super::{ModelVariant, OnnxSequenceModel, SequenceModel};
use crate::error::{ForecastError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// `<model_dir>/<disease>_forecast_<variant>.onnx`, disease lower-cased.
pub fn model_path(model_dir: &Path, disease: &str, variant: ModelVariant) -> PathBuf {
    model_dir.join(format!(
        "{}_forecast_{}.onnx",
        disease.to_lowercase(),
        variant.file_tag()
    ))
}

#[derive(Default, Clone)]
pub struct ModelRegistry {
    models: HashMap<(String, ModelVariant), Arc<dyn SequenceModel>>,
}

impl ModelRegistry {
    /// Build from already-constructed models.
    pub fn from_models<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = (S, ModelVariant, Arc<dyn SequenceModel>)>,
        S: AsRef<str>,
    {
        Self {
            models: models
                .into_iter()
                .map(|(d, v, m)| ((d.as_ref().to_lowercase(), v), m))
                .collect(),
        }
    }

    /// Load every variant of every disease found under `model_dir`. Missing or
    /// unloadable files are logged and left out; lookups then fail with
    /// `ModelUnavailable`.
    pub fn load(model_dir: &Path, diseases: &[String]) -> Self {
        let mut models: HashMap<(String, ModelVariant), Arc<dyn SequenceModel>> = HashMap::new();
        for disease in diseases {
            for variant in ModelVariant::ALL {
                let path = model_path(model_dir, disease, variant);
                if !path.exists() {
                    warn!(%disease, %variant, path = %path.display(), "model not found");
                    continue;
                }
                match OnnxSequenceModel::load(&path) {
                    Ok(m) => {
                        info!(%disease, %variant, input_shape = ?m.input_shape(), "model loaded");
                        models.insert((disease.to_lowercase(), variant), Arc::new(m));
                    }
                    Err(e) => warn!(%disease, %variant, error = %e, "model load failed"),
                }
            }
        }
        Self { models }
    }

    pub fn get(&self, disease: &str, variant: ModelVariant) -> Result<Arc<dyn SequenceModel>> {
        self.models
            .get(&(disease.to_lowercase(), variant))
            .cloned()
            .ok_or_else(|| ForecastError::ModelUnavailable {
                disease: disease.to_string(),
                variant,
            })
    }

    pub fn contains(&self, disease: &str, variant: ModelVariant) -> bool {
        self.models.contains_key(&(disease.to_lowercase(), variant))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.models.keys().collect();
        keys.sort();
        f.debug_struct("ModelRegistry").field("models", &keys).finish()
    }
}
