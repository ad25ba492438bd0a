//! HealthTrace forecasting core: daily disease case forecasts from climate covariates.
//!
//! Modular structure:
//! - [`data`]: CSV loading into a date-ordered feature table
//! - [`features`]: Min-max assembly, sliding windows, scale inversion
//! - [`model`]: Sequence model trait, ONNX inference, per-disease registry
//! - [`forecast`]: Iterative multi-step forecasting and the request service
//! - [`risk`]: Alert tiers against the recent historical average
//! - [`analysis`]: Feature factors, climate series, model evaluation
//! - [`logging`]: Structured JSON logging

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod logging;
pub mod model;
pub mod risk;
pub mod uplink;

pub use config::AppConfig;
pub use data::FeatureTable;
pub use error::ForecastError;
pub use features::{FeatureAssembler, ScaleInverter, SequenceWindower};
pub use forecast::ForecastService;
pub use logging::StructuredLogger;
pub use model::{ModelRegistry, ModelVariant, SequenceModel};
pub use risk::AlertLevel;
pub use uplink::ForecastPublisher;
