//! K-nearest neighbours classifier
//!
//! Stores the training data and answers queries with a max-heap partial
//! sort, O(n log k) per query. Probability is the positive fraction among
//! the k neighbours.

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    /// Fitting stores the training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(CardioError::FitFailure(format!(
                "feature rows ({}) and labels ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(CardioError::FitFailure("empty training set".to_string()));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(CardioError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(CardioError::NotFitted)?;
        let k = self.n_neighbors.min(x_train.nrows());

        let probs: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let neighbors = find_k_nearest(row.as_slice().unwrap(), x_train, y_train, k);
                let positives = neighbors.iter().filter(|(_, label)| *label >= 0.5).count();
                positives as f64 / neighbors.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(probs))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}

/// Max-heap entry keyed on distance, so the heap keeps the k smallest.
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

fn find_k_nearest(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = squared_euclidean(point, row.as_slice().unwrap());
        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_knn_separable() {
        let x = array![
            [1.0, 1.0],
            [1.5, 1.5],
            [2.0, 2.0],
            [1.2, 1.8],
            [8.0, 8.0],
            [8.5, 8.5],
            [9.0, 9.0],
            [8.2, 8.8]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_proba_is_neighbor_fraction() {
        let x = array![[0.0], [1.0], [2.0], [10.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();

        // neighbours of 0.5 are {0.0, 1.0, 2.0} -> one positive out of three
        let probs = knn.predict_proba(&array![[0.5]]).unwrap();
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_clamped_to_training_size() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];

        let mut knn = KnnClassifier::new(10);
        knn.fit(&x, &y).unwrap();
        let preds = knn.predict(&x).unwrap();
        assert_eq!(preds.len(), 2);
    }

    #[test]
    fn test_unfitted_predict_errors() {
        let knn = KnnClassifier::new(3);
        assert!(matches!(
            knn.predict(&array![[0.0]]),
            Err(CardioError::NotFitted)
        ));
    }
}
