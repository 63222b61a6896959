//! Feature standardization
//!
//! Per-column z-score transform fit once on training data and reapplied
//! identically at prediction time. The fitted parameters travel with the
//! model inside a [`ModelBundle`](crate::store::ModelBundle).

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaler: (x - mean) / std per column.
///
/// Uses the population standard deviation. Columns with zero variance keep
/// a scale of 1.0 so the transform stays defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            means: Array1::zeros(0),
            stds: Array1::zeros(0),
            is_fitted: false,
        }
    }

    /// Fit column means and standard deviations.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(CardioError::SchemaViolation(
                "cannot fit scaler on zero rows".to_string(),
            ));
        }

        let means = x.mean_axis(Axis(0)).unwrap();
        let mut stds = Array1::zeros(x.ncols());
        for (j, col) in x.axis_iter(Axis(1)).enumerate() {
            let mean = means[j];
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            stds[j] = if std == 0.0 { 1.0 } else { std };
        }

        self.means = means;
        self.stds = stds;
        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted transform to a matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_fitted(x.ncols())?;

        let mut out = x.clone();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.stds[j]);
            col.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(out)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Apply the fitted transform to a single feature vector.
    pub fn transform_row(&self, row: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_fitted(row.len())?;

        Ok(Array1::from_iter(row.iter().enumerate().map(|(j, &v)| {
            (v - self.means[j]) / self.stds[j]
        })))
    }

    fn check_fitted(&self, ncols: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(CardioError::InvalidInput(
                "scaler has not been fitted".to_string(),
            ));
        }
        if ncols != self.means.len() {
            return Err(CardioError::InvalidInput(format!(
                "scaler was fitted on {} columns, got {}",
                self.means.len(),
                ncols
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler_centers_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        for col in scaled.axis_iter(Axis(1)) {
            let mean: f64 = col.iter().sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_column_stays_finite() {
        let x = array![[7.0, 1.0], [7.0, 2.0], [7.0, 3.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        assert!(scaled.iter().all(|v| v.is_finite()));
        // constant column scales to zero, not NaN
        assert_eq!(scaled[[0, 0]], 0.0);
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let x = array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        let row = scaler.transform_row(&array![2.0, 5.0]).unwrap();
        assert!((row[0] - scaled[[1, 0]]).abs() < 1e-12);
        assert!((row[1] - scaled[[1, 1]]).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        let mut scaler = StandardScaler::new();
        assert!(matches!(
            scaler.fit(&x),
            Err(CardioError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_transform() {
        let x = array![[1.0, 4.0], [2.0, 5.0], [3.0, 9.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();

        let bytes = bincode::serialize(&scaler).unwrap();
        let restored: StandardScaler = bincode::deserialize(&bytes).unwrap();

        let row = array![2.5, 6.0];
        assert_eq!(
            scaler.transform_row(&row).unwrap(),
            restored.transform_row(&row).unwrap()
        );
    }
}
