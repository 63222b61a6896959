//! Decision tree
//!
//! CART with midpoint thresholds. Classification leaves hold the fraction
//! of positive samples, so the tree yields probability estimates without a
//! separate calibration pass; regression leaves hold the mean target (used
//! by the boosting ensemble).

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf value: positive-class fraction (classification) or mean target
    /// (regression).
    Leaf { value: f64, n_samples: usize },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    is_classification: bool,
    n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    /// Gini-criterion tree over binary {0, 1} labels.
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            is_classification: true,
            n_features: 0,
        }
    }

    /// Variance-criterion tree over continuous targets.
    pub fn new_regressor() -> Self {
        Self {
            is_classification: false,
            ..Self::new_classifier()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
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
        if n_samples == 0 {
            return Err(CardioError::FitFailure("empty training set".to_string()));
        }

        self.n_features = x.ncols();
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0));
        Ok(())
    }

    fn build_tree(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> TreeNode {
        let n = indices.len();
        let (count, sum, sq_sum) = stats(y, indices);
        let parent_impurity = self.impurity(count, sum, sq_sum);

        let should_stop = n < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || parent_impurity < MIN_GAIN;

        if should_stop {
            return TreeNode::Leaf {
                value: sum / count as f64,
                n_samples: n,
            };
        }

        let best = (0..self.n_features)
            .into_par_iter()
            .filter_map(|f| {
                self.best_split_for_feature(x, y, indices, f, parent_impurity)
                    .map(|(threshold, gain)| (f, threshold, gain))
            })
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feature_idx, threshold, _gain)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1));
                let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1));

                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                }
            }
            None => TreeNode::Leaf {
                value: sum / count as f64,
                n_samples: n,
            },
        }
    }

    /// Single sorted sweep over one feature: prefix statistics give the
    /// impurity of both sides at every candidate boundary.
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        feature_idx: usize,
        parent_impurity: f64,
    ) -> Option<(f64, f64)> {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature_idx]]
                .partial_cmp(&x[[b, feature_idx]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = order.len();
        let (total_n, total_sum, total_sq) = stats(y, &order);

        let mut left_n = 0usize;
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<(f64, f64)> = None;

        for w in 0..n - 1 {
            let i = order[w];
            let yi = y[i];
            left_n += 1;
            left_sum += yi;
            left_sq += yi * yi;

            let here = x[[i, feature_idx]];
            let next = x[[order[w + 1], feature_idx]];
            if here == next {
                continue;
            }

            let right_n = total_n - left_n;
            if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                continue;
            }

            let left_imp = self.impurity(left_n, left_sum, left_sq);
            let right_imp = self.impurity(right_n, total_sum - left_sum, total_sq - left_sq);
            let weighted = (left_n as f64 * left_imp + right_n as f64 * right_imp) / n as f64;

            let gain = parent_impurity - weighted;
            if gain > MIN_GAIN && best.map_or(true, |(_, g)| gain > g) {
                best = Some(((here + next) / 2.0, gain));
            }
        }

        best
    }

    /// Gini from the positive count (classification; labels are 0/1, so the
    /// running sum IS the positive count) or variance (regression).
    fn impurity(&self, count: usize, sum: f64, sq_sum: f64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        if self.is_classification {
            let p = sum / n;
            1.0 - p * p - (1.0 - p) * (1.0 - p)
        } else {
            sq_sum / n - (sum / n).powi(2)
        }
    }

    /// Raw leaf values: probabilities for a classifier, means for a regressor.
    pub fn predict_values(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CardioError::NotFitted)?;

        let values: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                predict_sample(root, &row.to_vec())
            })
            .collect();

        Ok(Array1::from_vec(values))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let values = self.predict_values(x)?;
        if self.is_classification {
            Ok(values.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
        } else {
            Ok(values)
        }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_classification {
            return Err(CardioError::InvalidInput(
                "probability estimates are only defined for classification trees".to_string(),
            ));
        }
        self.predict_values(x)
    }

    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

fn stats(y: &Array1<f64>, indices: &[usize]) -> (usize, f64, f64) {
    let mut sum = 0.0;
    let mut sq_sum = 0.0;
    for &i in indices {
        sum += y[i];
        sq_sum += y[i] * y[i];
    }
    (indices.len(), sum, sq_sum)
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_classifier() {
        let x = array![[1.0], [2.0], [3.0], [8.0], [9.0], [10.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let preds = tree.predict(&x).unwrap();
        assert_eq!(preds, y);

        let probs = tree.predict_proba(&array![[1.5], [9.5]]).unwrap();
        assert_eq!(probs[0], 0.0);
        assert_eq!(probs[1], 1.0);
    }

    #[test]
    fn test_regressor_fits_means() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![10.0, 10.0, 20.0, 20.0];

        let mut tree = DecisionTree::new_regressor();
        tree.fit(&x, &y).unwrap();

        let preds = tree.predict(&x).unwrap();
        assert!((preds[0] - 10.0).abs() < 1e-9);
        assert!((preds[3] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new_classifier().with_max_depth(2);
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth() <= 3); // root split + one level + leaves
    }

    #[test]
    fn test_single_class_is_a_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&x).unwrap(), array![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let tree = DecisionTree::new_classifier();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(CardioError::NotFitted)
        ));
    }
}
