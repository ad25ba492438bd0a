//! Feature preparation: column selection, min-max scaling and sequence windowing.

mod assembler;
mod scaling;
mod window;

pub use assembler::{FeatureAssembler, NormalizedMatrix, MISSING_FILL};
pub use scaling::{ColumnStatistics, ColumnStats, ScaleInverter};
pub use window::{Sequence, SequenceWindower};

use crate::data::FeatureTable;
use crate::error::Result;
use ndarray::Array2;

/// Output of one pass through assemble → window for inference.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub matrix: NormalizedMatrix,
    pub statistics: ColumnStatistics,
    pub trailing_window: Array2<f64>,
}

/// Assemble a table and cut the trailing window. Statistics are fitted fresh.
pub fn prepare_inference(
    table: &FeatureTable,
    assembler: &FeatureAssembler,
    windower: &SequenceWindower,
) -> Result<PreparedInput> {
    let (matrix, statistics) = assembler.assemble(table)?;
    let trailing_window = windower.trailing_window(&matrix)?;
    Ok(PreparedInput {
        matrix,
        statistics,
        trailing_window,
    })
}
