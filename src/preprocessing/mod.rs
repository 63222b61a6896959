//! Dataset preparation
//!
//! Turns a raw tabular dataset into a standardized feature matrix and an
//! aligned label vector, and yields the fitted scaler so the same transform
//! can be reapplied to unseen inputs at prediction time.

mod scaler;

pub use scaler::StandardScaler;

use crate::error::{CardioError, Result};
use crate::schema::{self, N_FEATURES};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Output of [`Preprocessor::prepare`].
///
/// Invariant: `x.nrows() == y.len()`; `x` has exactly [`N_FEATURES`] columns
/// in schema order, standardized by `scaler`.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub scaler: StandardScaler,
}

/// Cleans a raw dataset into training-ready matrices.
///
/// Rows with a missing value in any required column are dropped entirely.
/// Cells that survive but fail numeric coercion become 0.0. Explicit
/// policy, not an error.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn prepare(&self, df: &DataFrame) -> Result<PreparedData> {
        let mut columns = Vec::with_capacity(N_FEATURES + 1);
        for name in schema::required_columns() {
            let col = df.column(name).map_err(|_| {
                CardioError::SchemaViolation(format!("missing required column '{name}'"))
            })?;
            columns.push(col.as_materialized_series().clone());
        }

        let n_rows = df.height();

        // Missing-value judgement happens on the original dtype, before any
        // numeric cast, so a blank cell drops the row while a non-numeric
        // cell merely coerces to 0.0 below.
        let mut keep = vec![true; n_rows];
        for series in &columns {
            if series.null_count() == 0 {
                continue;
            }
            for (i, is_null) in series.is_null().into_iter().enumerate() {
                if is_null.unwrap_or(true) {
                    keep[i] = false;
                }
            }
        }

        let kept: Vec<usize> = (0..n_rows).filter(|&i| keep[i]).collect();
        if kept.is_empty() {
            return Err(CardioError::SchemaViolation(
                "no usable rows after dropping incomplete records".to_string(),
            ));
        }
        if kept.len() < n_rows {
            tracing::debug!(
                dropped = n_rows - kept.len(),
                kept = kept.len(),
                "dropped rows with missing required fields"
            );
        }

        let mut numeric: Vec<Vec<f64>> = Vec::with_capacity(N_FEATURES + 1);
        for series in &columns {
            let casted = series
                .cast(&DataType::Float64)
                .map_err(|e| CardioError::DataError(e.to_string()))?;
            let values: Vec<f64> = casted
                .f64()
                .map_err(|e| CardioError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            numeric.push(values);
        }

        let x_raw = Array2::from_shape_fn((kept.len(), N_FEATURES), |(r, c)| numeric[c][kept[r]]);
        let y = Array1::from_iter(kept.iter().map(|&i| numeric[N_FEATURES][i]));

        let mut scaler = StandardScaler::new();
        let x = scaler.fit_transform(&x_raw)?;

        Ok(PreparedData { x, y, scaler })
    }
}
