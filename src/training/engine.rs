//! Training engine
//!
//! Prepares the dataset, carves out a reproducible held-out split, fits a
//! fresh classifier from the registry and scores it. The fitted model and
//! its scaler come back together as a bundle; persisting it is a separate,
//! explicit step through the [`ModelStore`](crate::store::ModelStore).

use crate::error::{CardioError, Result};
use crate::models::ModelKind;
use crate::preprocessing::Preprocessor;
use crate::store::ModelBundle;
use crate::training::MetricsReport;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Split seed. Fixed so repeated runs on identical data are bit-reproducible.
pub const SPLIT_SEED: u64 = 42;

/// Held-out fraction of rows.
pub const TEST_FRACTION: f64 = 0.2;

/// Result of one training run: the metrics snapshot and the fitted bundle.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub report: MetricsReport,
    pub bundle: ModelBundle,
}

#[derive(Debug, Clone)]
pub struct Trainer {
    test_fraction: f64,
    seed: u64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self {
            test_fraction: TEST_FRACTION,
            seed: SPLIT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train `kind` on `df` and evaluate it on a held-out 20% split.
    pub fn train(&self, df: &DataFrame, kind: ModelKind) -> Result<TrainingOutcome> {
        let prepared = Preprocessor::new().prepare(df)?;
        let n = prepared.x.nrows();

        let (train_idx, test_idx) = self.split_indices(n)?;
        tracing::info!(
            model = kind.name(),
            n_train = train_idx.len(),
            n_test = test_idx.len(),
            "training"
        );

        let x_train = prepared.x.select(Axis(0), &train_idx);
        let y_train: Array1<f64> = Array1::from_iter(train_idx.iter().map(|&i| prepared.y[i]));
        let x_test = prepared.x.select(Axis(0), &test_idx);
        let y_test: Array1<f64> = Array1::from_iter(test_idx.iter().map(|&i| prepared.y[i]));

        let mut classifier = kind.instantiate();
        classifier.fit(&x_train, &y_train)?;

        let y_pred = classifier.predict(&x_test)?;
        let report = MetricsReport::compute(kind, &y_test, &y_pred);
        tracing::info!(model = kind.name(), accuracy = report.accuracy, "trained");

        Ok(TrainingOutcome {
            report,
            bundle: ModelBundle {
                kind,
                classifier,
                scaler: prepared.scaler,
            },
        })
    }

    /// Seeded shuffled partition: `ceil(test_fraction * n)` held-out rows,
    /// at least one on each side.
    fn split_indices(&self, n: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let n_test = ((n as f64) * self.test_fraction).ceil() as usize;
        let n_test = n_test.max(1);
        if n_test >= n {
            return Err(CardioError::SchemaViolation(format!(
                "insufficient data: {n} usable rows cannot be split for training"
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let test_idx = indices.split_off(n - n_test);
        Ok((indices, test_idx))
    }
}

/// Fit a fresh `kind` on one index subset and score accuracy on another.
/// Shared by the cross-validation loop.
pub(crate) fn fit_score_subset(
    kind: ModelKind,
    x: &Array2<f64>,
    y: &Array1<f64>,
    train_idx: &[usize],
    test_idx: &[usize],
) -> Result<f64> {
    let x_train = x.select(Axis(0), train_idx);
    let y_train: Array1<f64> = Array1::from_iter(train_idx.iter().map(|&i| y[i]));
    let x_test = x.select(Axis(0), test_idx);
    let y_test: Array1<f64> = Array1::from_iter(test_idx.iter().map(|&i| y[i]));

    let mut classifier = kind.instantiate();
    classifier.fit(&x_train, &y_train)?;
    let y_pred = classifier.predict(&x_test)?;

    let correct = y_test
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| (t >= 0.5) == (p >= 0.5))
        .count();
    Ok(correct as f64 / y_test.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_deterministic() {
        let trainer = Trainer::new();
        let (a_train, a_test) = trainer.split_indices(50).unwrap();
        let (b_train, b_test) = trainer.split_indices(50).unwrap();
        assert_eq!(a_train, b_train);
        assert_eq!(a_test, b_test);
    }

    #[test]
    fn test_split_sizes() {
        let trainer = Trainer::new();
        let (train, test) = trainer.split_indices(20).unwrap();
        assert_eq!(test.len(), 4);
        assert_eq!(train.len(), 16);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_not_ordinal() {
        let trainer = Trainer::new();
        let (_, test) = trainer.split_indices(100).unwrap();
        // an ordinal split would hold out the trailing block
        assert_ne!(test, (80..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_too_few_rows_rejected() {
        let trainer = Trainer::new();
        assert!(matches!(
            trainer.split_indices(1),
            Err(CardioError::SchemaViolation(_))
        ));
    }
}
