//! cardioml: heart-disease risk classification
//!
//! Given a rectangular dataset over a fixed 16-feature schema, this crate
//! trains one of seven classifier families, compares them with k-fold
//! cross-validation, persists fitted (model, scaler) bundles, and scores
//! single feature vectors against a persisted bundle.
//!
//! # Modules
//!
//! - [`schema`] - the fixed feature/label contract
//! - [`data`] - CSV ingestion
//! - [`preprocessing`] - row filtering, coercion, standardization
//! - [`models`] - the model registry and seven classifier families
//! - [`training`] - held-out training and cross-validation
//! - [`store`] - persisted bundles
//! - [`inference`] - risk prediction from raw inputs
//! - [`cli`] - command-line harness

pub mod cli;
pub mod data;
pub mod error;
pub mod inference;
pub mod models;
pub mod preprocessing;
pub mod schema;
pub mod store;
pub mod training;

pub use error::{CardioError, Result};

/// Re-export of the commonly used types.
pub mod prelude {
    pub use crate::error::{CardioError, Result};
    pub use crate::inference::{Predictor, RiskAssessment, RiskLabel};
    pub use crate::models::{Classifier, ModelKind};
    pub use crate::preprocessing::{PreparedData, Preprocessor, StandardScaler};
    pub use crate::store::{ModelBundle, ModelStore};
    pub use crate::training::{CvReport, CvScore, Evaluator, MetricsReport, Trainer, TrainingOutcome};
}
