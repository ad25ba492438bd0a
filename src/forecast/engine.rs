//! Multi-step forecasting: feed each prediction back through a rolling window.
//!
//! Only the target is predicted. Covariates in every appended row are copied
//! from the last observed row, so longer horizons drift from reality as the
//! weather, air quality etc. stay frozen at their last known values.

use crate::features::ScaleInverter;
use crate::model::{ModelError, SequenceModel};
use crate::risk::display_count;
use chrono::{Duration, NaiveDate};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Fixed-length buffer of scaled rows, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    rows: Array2<f64>,
    target_index: usize,
}

impl RollingWindow {
    /// `target_index` must address a column of `rows`.
    pub fn new(rows: Array2<f64>, target_index: usize) -> Self {
        debug_assert!(target_index < rows.ncols());
        Self { rows, target_index }
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.rows.view()
    }

    /// Drop the oldest row and append a copy of the newest row whose target is `prediction`.
    pub fn advance(&mut self, prediction: f64) {
        let l = self.rows.nrows();
        if l == 0 {
            return;
        }
        let mut next = self.rows.row(l - 1).to_owned();
        next[self.target_index] = prediction;
        for i in 1..l {
            for j in 0..self.rows.ncols() {
                self.rows[[i - 1, j]] = self.rows[[i, j]];
            }
        }
        self.rows.row_mut(l - 1).assign(&next);
    }
}

/// Run `horizon` steps; returns scaled predictions in chronological order.
pub fn forecast_scaled(
    model: &dyn SequenceModel,
    window: &mut RollingWindow,
    horizon: usize,
) -> Result<Vec<f64>, ModelError> {
    let mut predictions = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let p = model.predict(window.view())?;
        predictions.push(p);
        window.advance(p);
    }
    Ok(predictions)
}

/// The `horizon` calendar days after `last_observed`.
pub fn forecast_dates(last_observed: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|i| last_observed + Duration::days(i))
        .collect()
}

/// One forecast day as served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub cases: u64,
}

/// Dated forecast in case-count units.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Inverted, unclamped predictions.
    pub raw_cases: Vec<f64>,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn cases(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.cases).collect()
    }
}

/// Scaled loop → inverse scaling → dates and display counts.
pub fn run_forecast(
    model: &dyn SequenceModel,
    trailing_window: Array2<f64>,
    inverter: &ScaleInverter,
    last_observed: NaiveDate,
    horizon: usize,
) -> Result<Forecast, ModelError> {
    let target_index = trailing_window.ncols().saturating_sub(1);
    let mut window = RollingWindow::new(trailing_window, target_index);
    let scaled = forecast_scaled(model, &mut window, horizon)?;
    let raw_cases = inverter.invert(&scaled);
    let points = forecast_dates(last_observed, horizon)
        .into_iter()
        .zip(&raw_cases)
        .map(|(date, &v)| ForecastPoint {
            date,
            cases: display_count(v),
        })
        .collect();
    Ok(Forecast { raw_cases, points })
}
