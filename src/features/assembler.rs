//! Feature assembly: feature table → covariates + target → min-max scaled matrix.

use super::{ColumnStatistics, ColumnStats};
use crate::data::{FeatureTable, TARGET_COLUMN};
use crate::error::{ForecastError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::{debug, warn};

/// Value substituted for missing covariate cells and absent schema columns.
pub const MISSING_FILL: f64 = 0.0;

/// Scaled feature matrix: rows are days, columns are covariates then target.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatrix {
    values: Array2<f64>,
    columns: Vec<String>,
}

impl NormalizedMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn target_index(&self) -> usize {
        self.ncols() - 1
    }

    pub fn target_column(&self) -> ArrayView1<'_, f64> {
        self.values.column(self.target_index())
    }
}

/// Selects, fills and scales the columns of a [`FeatureTable`].
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    schema: Option<Vec<String>>,
}

impl FeatureAssembler {
    /// Use every covariate in the table, in source order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the covariate columns and their order. Schema columns absent from
    /// a table are filled with [`MISSING_FILL`]; extra table columns are ignored.
    pub fn with_schema<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    /// Covariate names this assembler would select from `table`.
    pub fn feature_columns(&self, table: &FeatureTable) -> Vec<String> {
        match &self.schema {
            Some(schema) => schema.clone(),
            None => table
                .covariate_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn assemble(&self, table: &FeatureTable) -> Result<(NormalizedMatrix, ColumnStatistics)> {
        let features = self.feature_columns(table);
        if features.is_empty() {
            return Err(ForecastError::InsufficientFeatures { found: 0 });
        }

        let rows = table.len();
        let mut raw: Vec<(String, Vec<f64>)> = Vec::with_capacity(features.len() + 1);
        for name in features {
            let values = match table.covariate(&name) {
                Some(col) => col.iter().map(|v| v.unwrap_or(MISSING_FILL)).collect(),
                None => {
                    warn!(column = %name, fill = MISSING_FILL, "schema column absent; filling");
                    vec![MISSING_FILL; rows]
                }
            };
            raw.push((name, values));
        }
        if self.schema.is_some() {
            for name in table.covariate_names() {
                if !raw.iter().any(|(n, _)| n == name) {
                    debug!(column = name, "column not in schema; ignored");
                }
            }
        }
        raw.push((TARGET_COLUMN.to_string(), table.target().to_vec()));

        let ncols = raw.len();
        let mut values = Array2::<f64>::zeros((rows, ncols));
        let mut stats = Vec::with_capacity(ncols);
        let mut columns = Vec::with_capacity(ncols);
        for (j, (name, col)) in raw.into_iter().enumerate() {
            let s = ColumnStats::fit(name.clone(), &col);
            for (i, v) in col.iter().enumerate() {
                values[[i, j]] = s.normalize(*v);
            }
            stats.push(s);
            columns.push(name);
        }

        debug!(rows, columns = ncols, "assembled normalized matrix");
        Ok((
            NormalizedMatrix { values, columns },
            ColumnStatistics::new(stats),
        ))
    }
}
