//! Sliding windows over a normalized matrix.

use super::NormalizedMatrix;
use crate::error::{ForecastError, Result};
use ndarray::{s, Array1, Array2, Array3};

/// One supervised example: `window` rows `[i, i+L)`, `target` is row `i+L`'s case count.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub window: Array2<f64>,
    pub target: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SequenceWindower {
    window_len: usize,
}

impl SequenceWindower {
    /// Window lengths below 1 are raised to 1.
    pub fn new(window_len: usize) -> Self {
        Self {
            window_len: window_len.max(1),
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// All `T - L` training pairs, chronological. Empty when `T <= L`.
    pub fn training_pairs(&self, matrix: &NormalizedMatrix) -> Vec<Sequence> {
        let l = self.window_len;
        let view = matrix.view();
        let target = matrix.target_column();
        (0..matrix.nrows().saturating_sub(l))
            .map(|i| Sequence {
                window: view.slice(s![i..i + l, ..]).to_owned(),
                target: target[i + l],
            })
            .collect()
    }

    /// Training pairs stacked as `X: (n, L, columns)` and `y: (n,)` for export to a trainer.
    pub fn training_arrays(&self, matrix: &NormalizedMatrix) -> (Array3<f64>, Array1<f64>) {
        let pairs = self.training_pairs(matrix);
        let n = pairs.len();
        let mut x = Array3::<f64>::zeros((n, self.window_len, matrix.ncols()));
        let mut y = Array1::<f64>::zeros(n);
        for (i, p) in pairs.into_iter().enumerate() {
            x.slice_mut(s![i, .., ..]).assign(&p.window);
            y[i] = p.target;
        }
        (x, y)
    }

    /// The last `L` rows, the model input for the first forecast step.
    pub fn trailing_window(&self, matrix: &NormalizedMatrix) -> Result<Array2<f64>> {
        let t = matrix.nrows();
        if t < self.window_len {
            return Err(ForecastError::InsufficientHistory {
                available: t,
                required: self.window_len,
            });
        }
        Ok(matrix.view().slice(s![t - self.window_len.., ..]).to_owned())
    }
}
