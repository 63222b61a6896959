//! Integration tests: training across every registered family

use cardioml::error::CardioError;
use cardioml::models::ModelKind;
use cardioml::preprocessing::Preprocessor;
use cardioml::schema::{FEATURE_COLUMNS, LABEL_COLUMN, N_FEATURES};
use cardioml::training::Trainer;
use polars::prelude::*;

/// Synthetic dataset over the full schema: `n_per_class` rows per class,
/// every feature shifted by +30 for the positive class, so the labels are
/// perfectly separable on any single column.
fn heart_df(n_per_class: usize) -> DataFrame {
    let n = n_per_class * 2;
    let mut cols: Vec<Column> = Vec::with_capacity(N_FEATURES + 1);
    for (j, &name) in FEATURE_COLUMNS.iter().enumerate() {
        let vals: Vec<f64> = (0..n)
            .map(|i| {
                let class_shift = if i < n_per_class { 0.0 } else { 30.0 };
                10.0 + j as f64 + class_shift + (i % n_per_class) as f64 * 0.1
            })
            .collect();
        cols.push(Series::new(name.into(), vals).into());
    }
    let labels: Vec<f64> = (0..n)
        .map(|i| if i < n_per_class { 0.0 } else { 1.0 })
        .collect();
    cols.push(Series::new(LABEL_COLUMN.into(), labels).into());
    DataFrame::new(cols).unwrap()
}

#[test]
fn test_every_registered_model_trains() {
    let df = heart_df(10);
    let trainer = Trainer::new();

    for kind in ModelKind::ALL {
        let outcome = trainer
            .train(&df, kind)
            .unwrap_or_else(|e| panic!("{} failed to train: {e}", kind.name()));

        let report = &outcome.report;
        for (metric, value) in [
            ("accuracy", report.accuracy),
            ("precision", report.precision),
            ("recall", report.recall),
            ("f1", report.f1),
        ] {
            assert!(
                (0.0..=1.0).contains(&value),
                "{} {metric} out of range: {value}",
                kind.name()
            );
        }
        assert_eq!(outcome.bundle.kind, kind);
    }
}

#[test]
fn test_decision_tree_is_perfect_on_separable_data() {
    let df = heart_df(10);
    let outcome = Trainer::new().train(&df, ModelKind::DecisionTree).unwrap();

    assert_eq!(outcome.report.accuracy, 1.0);
    assert!(outcome.report.to_string().contains("Accuracy: 1.0000"));
}

#[test]
fn test_held_out_split_sizes() {
    let df = heart_df(10);
    let outcome = Trainer::new().train(&df, ModelKind::Knn).unwrap();
    // 20 rows -> ceil(0.2 * 20) = 4 held out
    assert_eq!(outcome.report.n_test, 4);
}

#[test]
fn test_training_is_reproducible() {
    let df = heart_df(10);
    let trainer = Trainer::new();

    let a = trainer.train(&df, ModelKind::RandomForest).unwrap();
    let b = trainer.train(&df, ModelKind::RandomForest).unwrap();
    assert_eq!(a.report.accuracy, b.report.accuracy);
    assert_eq!(a.report.f1, b.report.f1);
}

#[test]
fn test_single_class_labels_are_a_fit_failure() {
    let mut df = heart_df(10);
    let zeros = vec![0.0f64; 20];
    df.with_column(Series::new(LABEL_COLUMN.into(), zeros))
        .unwrap();

    for kind in [
        ModelKind::LogisticRegression,
        ModelKind::Svm,
        ModelKind::GradientBoosting,
    ] {
        let err = Trainer::new().train(&df, kind).unwrap_err();
        assert!(
            matches!(err, CardioError::FitFailure(_)),
            "{} should fail on single-class labels, got {err:?}",
            kind.name()
        );
    }
}

#[test]
fn test_row_with_missing_age_is_excluded() {
    let mut df = heart_df(10);
    let mut age: Vec<Option<f64>> = (0..20).map(|i| Some(40.0 + i as f64)).collect();
    age[3] = None;
    df.with_column(Series::new("age".into(), age)).unwrap();

    let prepared = Preprocessor::new().prepare(&df).unwrap();
    assert_eq!(prepared.x.nrows(), 19);
    assert_eq!(prepared.y.len(), 19);
}

#[test]
fn test_missing_required_column_fails_training() {
    let df = heart_df(10).drop("cholesterol").unwrap();
    let err = Trainer::new().train(&df, ModelKind::DecisionTree).unwrap_err();
    assert!(matches!(err, CardioError::SchemaViolation(_)));
}

#[test]
fn test_unknown_model_name() {
    let err = ModelKind::from_name("Bayesian Kitchen Sink").unwrap_err();
    assert!(matches!(err, CardioError::UnknownModel(_)));
}

#[test]
fn test_dataset_too_small_to_split() {
    let df = heart_df(10).head(Some(1));
    let err = Trainer::new().train(&df, ModelKind::DecisionTree).unwrap_err();
    assert!(matches!(err, CardioError::SchemaViolation(_)));
}
