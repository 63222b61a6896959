//! Held-out evaluation metrics

use crate::models::ModelKind;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy, precision, recall and F1 on a held-out split, positive class 1.
/// Immutable snapshot tied to one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub model: ModelKind,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub n_test: usize,
}

impl MetricsReport {
    pub fn compute(model: ModelKind, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t >= 0.5, *p >= 0.5) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let n = y_true.len();
        let accuracy = if n > 0 {
            (tp + tn) as f64 / n as f64
        } else {
            0.0
        };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            model,
            accuracy,
            precision,
            recall,
            f1,
            n_test: n,
        }
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom > 0 {
        num as f64 / denom as f64
    } else {
        0.0
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.model)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "Precision: {:.4}", self.precision)?;
        writeln!(f, "Recall: {:.4}", self.recall)?;
        write!(f, "F1 Score: {:.4}", self.f1)
    }
}
