//! K-fold cross-validation
//!
//! Compares model families over one dataset: the Preprocessor runs once,
//! then each fold fits a fresh instance from the registry. Folds are
//! shuffled with a fixed seed, so repeated runs on identical data report
//! identical mean/std.

use crate::error::{CardioError, Result};
use crate::models::ModelKind;
use crate::preprocessing::Preprocessor;
use crate::training::engine::fit_score_subset;
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single train/test fold.
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Shuffled, seeded k-fold splitter. Every index lands in exactly one test
/// fold.
#[derive(Debug, Clone)]
pub struct KFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl Default for KFold {
    fn default() -> Self {
        Self {
            n_splits: 5,
            seed: 42,
        }
    }
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(CardioError::InvalidInput(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(CardioError::SchemaViolation(format!(
                "insufficient data: {} usable rows for {}-fold cross-validation",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;
        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }
}

/// Cross-validated accuracy of one model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScore {
    pub kind: ModelKind,
    pub fold_accuracies: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScore {
    pub fn from_scores(kind: ModelKind, fold_accuracies: Vec<f64>) -> Self {
        let n = fold_accuracies.len() as f64;
        let mean = fold_accuracies.iter().sum::<f64>() / n;
        let variance = fold_accuracies
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            kind,
            fold_accuracies,
            mean,
            std: variance.sqrt(),
        }
    }
}

impl fmt::Display for CvScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Cross-Validation Accuracy: {:.4} (\u{b1} {:.4})",
            self.kind, self.mean, self.std
        )
    }
}

/// Outcome for one model inside a batch evaluation. A failing model keeps
/// its slot so the report still lists every family in registry order.
#[derive(Debug)]
pub struct CvOutcome {
    pub kind: ModelKind,
    pub result: Result<CvScore>,
}

/// Batch cross-validation report, one entry per registered model.
#[derive(Debug)]
pub struct CvReport {
    pub outcomes: Vec<CvOutcome>,
}

impl fmt::Display for CvReport {
    /// One line per model, registry order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &outcome.result {
                Ok(score) => write!(
                    f,
                    "{}: Accuracy = {:.4} (\u{b1} {:.4})",
                    outcome.kind, score.mean, score.std
                )?,
                Err(err) => write!(f, "{}: error: {}", outcome.kind, err)?,
            }
        }
        Ok(())
    }
}

/// Runs k-fold cross-validation for one or all registered models.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    kfold: KFold,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kfold(mut self, kfold: KFold) -> Self {
        self.kfold = kfold;
        self
    }

    /// Cross-validate a single model family.
    pub fn cross_validate(&self, df: &DataFrame, kind: ModelKind) -> Result<CvScore> {
        let prepared = Preprocessor::new().prepare(df)?;
        let splits = self.kfold.split(prepared.x.nrows())?;
        self.score_model(kind, &prepared.x, &prepared.y, &splits)
    }

    /// Cross-validate every registered model, in registry order. A model
    /// whose fit fails contributes an error entry; the batch continues.
    pub fn cross_validate_all(&self, df: &DataFrame) -> Result<CvReport> {
        let prepared = Preprocessor::new().prepare(df)?;
        let splits = self.kfold.split(prepared.x.nrows())?;

        let outcomes = ModelKind::ALL
            .iter()
            .map(|&kind| {
                let result = self.score_model(kind, &prepared.x, &prepared.y, &splits);
                if let Err(err) = &result {
                    tracing::warn!(model = kind.name(), %err, "cross-validation failed");
                }
                CvOutcome { kind, result }
            })
            .collect();

        Ok(CvReport { outcomes })
    }

    fn score_model(
        &self,
        kind: ModelKind,
        x: &ndarray::Array2<f64>,
        y: &ndarray::Array1<f64>,
        splits: &[FoldSplit],
    ) -> Result<CvScore> {
        let mut fold_accuracies = Vec::with_capacity(splits.len());
        for split in splits {
            let accuracy =
                fit_score_subset(kind, x, y, &split.train_indices, &split.test_indices)?;
            fold_accuracies.push(accuracy);
        }
        Ok(CvScore::from_scores(kind, fold_accuracies))
    }
}
