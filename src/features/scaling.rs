//! Min-max scaling to [0, 1], fitted per column.
//!
//! `x' = (x - min) / (max - min)`; the inverse is `x = x' * (max - min) + min`.
//! A constant column scales to 0.0 everywhere and inverts back to its min.

use serde::{Deserialize, Serialize};

/// Fitted min/max of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Fit over a column's full history. An empty column fits to `[0, 0]`.
    pub fn fit(column: impl Into<String>, values: &[f64]) -> Self {
        let (min, max) = values
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 0.0));
        Self {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }

    pub fn invert(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }
}

/// Statistics for every assembled column, in matrix column order (target last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    columns: Vec<ColumnStats>,
}

impl ColumnStatistics {
    pub(crate) fn new(columns: Vec<ColumnStats>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    /// The target column's own entry.
    pub fn target(&self) -> &ColumnStats {
        // Assembly always produces at least one covariate plus the target.
        &self.columns[self.columns.len() - 1]
    }
}

/// Maps normalized case-count predictions back to case counts.
///
/// Holds the target column's statistics only. Output is not clamped.
#[derive(Debug, Clone)]
pub struct ScaleInverter {
    target: ColumnStats,
}

impl ScaleInverter {
    pub fn new(target: ColumnStats) -> Self {
        Self { target }
    }

    pub fn from_statistics(stats: &ColumnStatistics) -> Self {
        Self::new(stats.target().clone())
    }

    pub fn invert(&self, predictions: &[f64]) -> Vec<f64> {
        predictions.iter().map(|&p| self.target.invert(p)).collect()
    }
}
