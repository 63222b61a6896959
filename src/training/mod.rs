//! Model training and evaluation
//!
//! The [`Trainer`] fits one family on a held-out split; the [`Evaluator`]
//! compares families with k-fold cross-validation.

pub mod cross_validation;
mod engine;
mod metrics;

pub use cross_validation::{CvOutcome, CvReport, CvScore, Evaluator, FoldSplit, KFold};
pub use engine::{Trainer, TrainingOutcome, SPLIT_SEED, TEST_FRACTION};
pub use metrics::MetricsReport;
