//! Random forest
//!
//! Bagged classification trees. Each tree sees a bootstrap sample of the
//! rows and a random sqrt-sized subset of the columns; the forest
//! probability is the mean of the tree leaf probabilities.

use crate::error::{CardioError, Result};
use crate::models::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub random_state: u64,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
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
        if n_samples == 0 {
            return Err(CardioError::FitFailure("empty training set".to_string()));
        }

        let n_cols_per_tree = ((n_features as f64).sqrt().ceil() as usize).max(1);

        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let mut col_indices: Vec<usize> = (0..n_features).collect();
                col_indices.shuffle(&mut rng);
                col_indices.truncate(n_cols_per_tree);
                col_indices.sort_unstable();

                let x_boot = x
                    .select(Axis(0), &sample_indices)
                    .select(Axis(1), &col_indices);
                let y_boot: Array1<f64> =
                    Array1::from_iter(sample_indices.iter().map(|&i| y[i]));

                let mut tree = DecisionTree::new_classifier()
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.fit(&x_boot, &y_boot)?;

                Ok((tree, col_indices))
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = Vec::with_capacity(fitted.len());
        self.col_indices_per_tree = Vec::with_capacity(fitted.len());
        for (tree, cols) in fitted {
            self.trees.push(tree);
            self.col_indices_per_tree.push(cols);
        }

        Ok(())
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CardioError::NotFitted);
        }

        let n = x.nrows();
        let mut acc = Array1::zeros(n);
        for (tree, cols) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(Axis(1), cols);
            acc = acc + tree.predict_proba(&x_sub)?;
        }
        Ok(acc / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}
