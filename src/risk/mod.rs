//! Outbreak alert tiers.

mod alert;

pub use alert::{display_count, Alert, AlertLevel, AlertPolicy};
pub(crate) use alert::mean;
