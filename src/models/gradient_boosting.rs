//! Gradient boosting for binary classification
//!
//! Log-loss boosting: start from the base-rate log odds, then repeatedly fit
//! a shallow regression tree to the residuals (label minus current
//! probability) and shrink it into the ensemble.

use crate::error::{CardioError, Result};
use crate::models::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    trees: Vec<DecisionTree>,
    initial_log_odds: f64,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Row fraction drawn (without replacement) for each boosting round.
    pub subsample: f64,
    pub random_state: u64,
    is_fitted: bool,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientBoosting {
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            initial_log_odds: 0.0,
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            random_state: 42,
            is_fitted: false,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(CardioError::FitFailure(format!(
                "feature rows ({}) and labels ({}) disagree",
                n_samples,
                y.len()
            )));
        }

        let p = y.mean().unwrap_or(0.5);
        if p <= 0.0 || p >= 1.0 {
            return Err(CardioError::FitFailure(
                "training labels contain a single class".to_string(),
            ));
        }
        self.initial_log_odds = (p / (1.0 - p)).ln();

        let mut log_odds = Array1::from_elem(n_samples, self.initial_log_odds);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.random_state);
        self.trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(log_odds.iter())
                .map(|(yi, &lo)| yi - 1.0 / (1.0 + (-lo).exp()))
                .collect();

            let row_indices = self.subsample_indices(n_samples, &mut rng);
            let x_sub = x.select(Axis(0), &row_indices);
            let r_sub: Array1<f64> =
                Array1::from_iter(row_indices.iter().map(|&i| residuals[i]));

            let mut tree = DecisionTree::new_regressor().with_max_depth(self.max_depth);
            tree.fit(&x_sub, &r_sub)?;

            let update = tree.predict_values(x)?;
            for i in 0..n_samples {
                log_odds[i] += self.learning_rate * update[i];
            }

            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(CardioError::NotFitted);
        }

        let n = x.nrows();
        let mut log_odds = Array1::from_elem(n, self.initial_log_odds);
        for tree in &self.trees {
            let update = tree.predict_values(x)?;
            for i in 0..n {
                log_odds[i] += self.learning_rate * update[i];
            }
        }

        Ok(log_odds.mapv(|lo| 1.0 / (1.0 + (-lo).exp())))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn subsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.subsample >= 1.0 {
            return (0..n).collect();
        }
        let sample_size = (((n as f64) * self.subsample).ceil() as usize).max(1);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size);
        indices.sort_unstable();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_boosting_classifies_separable_data() {
        let x = array![
            [0.0],
            [0.2],
            [0.4],
            [0.6],
            [0.8],
            [5.0],
            [5.2],
            [5.4],
            [5.6],
            [5.8]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = GradientBoosting::new().with_n_estimators(20);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 0.0];

        let mut model = GradientBoosting::new();
        assert!(matches!(
            model.fit(&x, &y),
            Err(CardioError::FitFailure(_))
        ));
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 0.0, 1.0, 0.0, 1.0, 1.0];

        let mut model = GradientBoosting::new().with_n_estimators(10);
        model.fit(&x, &y).unwrap();

        let probs = model.predict_proba(&x).unwrap();
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}
