//! Linear support vector machine
//!
//! Trained by stochastic subgradient descent on the L2-regularized hinge
//! loss (Pegasos schedule). Features arrive standardized, so a linear
//! margin is the working member of this family here. The reported
//! probability is the sigmoid of the signed margin.

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    weights: Option<Array1<f64>>,
    bias: f64,
    /// Soft-margin cost. The Pegasos regularization is lambda = 1 / (C · n).
    pub c: f64,
    pub epochs: usize,
    pub random_state: u64,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSvm {
    pub fn new() -> Self {
        Self {
            weights: None,
            bias: 0.0,
            c: 1.0,
            epochs: 100,
            random_state: 42,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(CardioError::FitFailure(format!(
                "feature rows ({}) and labels ({}) disagree",
                n_samples,
                y.len()
            )));
        }
        if y.iter().all(|&v| v == y[0]) {
            return Err(CardioError::FitFailure(
                "training labels contain a single class".to_string(),
            ));
        }

        // {0, 1} -> {-1, +1}
        let signed: Vec<f64> = y.iter().map(|&v| if v >= 0.5 { 1.0 } else { -1.0 }).collect();

        let lambda = 1.0 / (self.c * n_samples as f64);
        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.random_state);
        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut t = 0usize;

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                t += 1;
                let eta = 1.0 / (lambda * t as f64);
                let row = x.row(i);
                let margin = signed[i] * (row.dot(&weights) + bias);

                weights.mapv_inplace(|w| w * (1.0 - eta * lambda));
                if margin < 1.0 {
                    let scale = eta * signed[i];
                    weights.zip_mut_with(&row, |w, &xi| *w += scale * xi);
                    bias += scale;
                }
            }
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }

    /// Signed distance from the separating hyperplane.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(CardioError::NotFitted)?;
        Ok(x.dot(weights) + self.bias)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision.mapv(|d| if d >= 0.0 { 1.0 } else { 0.0 }))
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let decision = self.decision_function(x)?;
        Ok(decision.mapv(|d| 1.0 / (1.0 + (-d).exp())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_svm_separable() {
        let x = array![
            [-2.0, -1.0],
            [-1.8, -1.2],
            [-2.2, -0.8],
            [-1.9, -1.1],
            [2.0, 1.0],
            [1.8, 1.2],
            [2.2, 0.8],
            [1.9, 1.1]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = LinearSvm::new();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_probability_tracks_margin_sign() {
        let x = array![[-3.0], [-2.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut model = LinearSvm::new();
        model.fit(&x, &y).unwrap();

        let probs = model.predict_proba(&x).unwrap();
        assert!(probs[0] < 0.5);
        assert!(probs[3] > 0.5);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];

        let mut model = LinearSvm::new();
        assert!(matches!(
            model.fit(&x, &y),
            Err(CardioError::FitFailure(_))
        ));
    }
}
