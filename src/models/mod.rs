//! Classifier families and the model registry
//!
//! Seven algorithm families, enumerable in a fixed registry order. The
//! registry is a factory: every [`ModelKind::instantiate`] call returns a
//! fresh, untrained configuration, so no classifier state ever leaks
//! between training runs.

pub mod decision_tree;
pub mod gradient_boosting;
pub mod knn;
pub mod logistic;
pub mod neural_network;
pub mod random_forest;
pub mod svm;

pub use decision_tree::DecisionTree;
pub use gradient_boosting::GradientBoosting;
pub use knn::KnnClassifier;
pub use logistic::LogisticRegression;
pub use neural_network::{MlpClassifier, MlpConfig};
pub use random_forest::RandomForest;
pub use svm::LinearSvm;

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One registered algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LogisticRegression,
    DecisionTree,
    RandomForest,
    Svm,
    Knn,
    GradientBoosting,
    NeuralNetwork,
}

impl ModelKind {
    /// Every registered family, in registry order. Batch evaluation and
    /// report listings follow this order.
    pub const ALL: [ModelKind; 7] = [
        ModelKind::LogisticRegression,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::Svm,
        ModelKind::Knn,
        ModelKind::GradientBoosting,
        ModelKind::NeuralNetwork,
    ];

    /// Human-readable name, as shown in reports.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::Svm => "SVM",
            ModelKind::Knn => "KNN",
            ModelKind::GradientBoosting => "Gradient Boosting",
            ModelKind::NeuralNetwork => "Neural Network",
        }
    }

    /// Filesystem-safe name: lower-cased, spaces replaced with underscores.
    pub fn slug(&self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }

    /// Resolve a display name or slug, case-insensitively.
    pub fn from_name(name: &str) -> Result<ModelKind> {
        let needle = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().to_lowercase() == needle || kind.slug() == needle)
            .ok_or_else(|| CardioError::UnknownModel(name.to_string()))
    }

    /// Build a fresh, untrained classifier for this family.
    pub fn instantiate(&self) -> Classifier {
        match self {
            ModelKind::LogisticRegression => {
                Classifier::LogisticRegression(LogisticRegression::new().with_max_iter(1000))
            }
            ModelKind::DecisionTree => Classifier::DecisionTree(DecisionTree::new_classifier()),
            ModelKind::RandomForest => Classifier::RandomForest(RandomForest::new(100)),
            ModelKind::Svm => Classifier::Svm(LinearSvm::new()),
            ModelKind::Knn => Classifier::Knn(KnnClassifier::new(5)),
            ModelKind::GradientBoosting => Classifier::GradientBoosting(GradientBoosting::new()),
            ModelKind::NeuralNetwork => Classifier::NeuralNetwork(MlpClassifier::default()),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classifier of any registered family.
///
/// `predict` returns labels in {0.0, 1.0}; `predict_proba` the
/// positive-class probability, `None` when the family carries no
/// probability estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Svm(LinearSvm),
    Knn(KnnClassifier),
    GradientBoosting(GradientBoosting),
    NeuralNetwork(MlpClassifier),
}

impl Classifier {
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Classifier::LogisticRegression(m) => m.fit(x, y),
            Classifier::DecisionTree(m) => m.fit(x, y),
            Classifier::RandomForest(m) => m.fit(x, y),
            Classifier::Svm(m) => m.fit(x, y),
            Classifier::Knn(m) => m.fit(x, y),
            Classifier::GradientBoosting(m) => m.fit(x, y),
            Classifier::NeuralNetwork(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Classifier::LogisticRegression(m) => m.predict(x),
            Classifier::DecisionTree(m) => m.predict(x),
            Classifier::RandomForest(m) => m.predict(x),
            Classifier::Svm(m) => m.predict(x),
            Classifier::Knn(m) => m.predict(x),
            Classifier::GradientBoosting(m) => m.predict(x),
            Classifier::NeuralNetwork(m) => m.predict(x),
        }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<Array1<f64>>> {
        let proba = match self {
            Classifier::LogisticRegression(m) => m.predict_proba(x)?,
            Classifier::DecisionTree(m) => m.predict_proba(x)?,
            Classifier::RandomForest(m) => m.predict_proba(x)?,
            Classifier::Svm(m) => m.predict_proba(x)?,
            Classifier::Knn(m) => m.predict_proba(x)?,
            Classifier::GradientBoosting(m) => m.predict_proba(x)?,
            Classifier::NeuralNetwork(m) => m.predict_proba(x)?,
        };
        Ok(Some(proba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_is_fixed() {
        let names: Vec<&str> = ModelKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec![
                "Logistic Regression",
                "Decision Tree",
                "Random Forest",
                "SVM",
                "KNN",
                "Gradient Boosting",
                "Neural Network"
            ]
        );
    }

    #[test]
    fn test_from_name_accepts_display_name_and_slug() {
        assert_eq!(
            ModelKind::from_name("Logistic Regression").unwrap(),
            ModelKind::LogisticRegression
        );
        assert_eq!(
            ModelKind::from_name("gradient_boosting").unwrap(),
            ModelKind::GradientBoosting
        );
        assert_eq!(ModelKind::from_name("svm").unwrap(), ModelKind::Svm);
    }

    #[test]
    fn test_unknown_name_is_tagged() {
        let err = ModelKind::from_name("Quantum Forest").unwrap_err();
        assert!(matches!(err, CardioError::UnknownModel(_)));
    }

    #[test]
    fn test_slug_format() {
        assert_eq!(ModelKind::LogisticRegression.slug(), "logistic_regression");
        assert_eq!(ModelKind::Svm.slug(), "svm");
    }

    #[test]
    fn test_instantiate_returns_fresh_instances() {
        // fitting one instance must not affect a later instantiation
        let mut first = ModelKind::Knn.instantiate();
        let x = ndarray::array![[0.0], [1.0]];
        let y = ndarray::array![0.0, 1.0];
        first.fit(&x, &y).unwrap();

        let second = ModelKind::Knn.instantiate();
        assert!(matches!(
            second.predict(&x),
            Err(CardioError::NotFitted)
        ));
    }
}
