//! Risk prediction against a persisted bundle
//!
//! Validates a raw feature vector, applies the bundle's stored scaler (the
//! same mean/std as at training time) and renders the classifier's verdict
//! as a risk label, with the positive-class probability when the family
//! provides one.

use crate::error::{CardioError, Result};
use crate::models::ModelKind;
use crate::schema::N_FEATURES;
use crate::store::{self, ModelStore};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary risk verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    High,
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Low => f.write_str("Low Risk"),
            RiskLabel::High => f.write_str("High Risk"),
        }
    }
}

/// Prediction result for one feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub probability: Option<f64>,
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.probability {
            Some(p) => write!(f, "{} (Probability: {:.2})", self.label, p),
            None => write!(f, "{}", self.label),
        }
    }
}

/// Scores single feature vectors against previously saved bundles.
#[derive(Debug, Clone)]
pub struct Predictor {
    store: ModelStore,
}

impl Predictor {
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }

    /// Predict the risk label for one raw input vector: exactly
    /// [`N_FEATURES`] values in schema order, each parseable as a float.
    /// Any unparseable value fails the whole call.
    pub fn predict<S: AsRef<str>>(&self, kind: ModelKind, raw_inputs: &[S]) -> Result<RiskAssessment> {
        let features = parse_inputs(raw_inputs)?;

        let bundle = self
            .store
            .load(kind)?
            .ok_or_else(|| store::not_found(kind))?;

        let scaled = bundle.scaler.transform_row(&features)?;
        let x = scaled.insert_axis(ndarray::Axis(0));
        self.assess(&bundle, &x)
    }

    fn assess(&self, bundle: &crate::store::ModelBundle, x: &Array2<f64>) -> Result<RiskAssessment> {
        let prediction = bundle.classifier.predict(x)?[0];
        let label = if prediction >= 0.5 {
            RiskLabel::High
        } else {
            RiskLabel::Low
        };

        let probability = bundle
            .classifier
            .predict_proba(x)?
            .map(|probs| probs[0]);

        tracing::debug!(model = bundle.kind.name(), %label, "predicted");
        Ok(RiskAssessment { label, probability })
    }
}

fn parse_inputs<S: AsRef<str>>(raw_inputs: &[S]) -> Result<Array1<f64>> {
    if raw_inputs.len() != N_FEATURES {
        return Err(CardioError::InvalidInput(format!(
            "expected {} feature values, got {}",
            N_FEATURES,
            raw_inputs.len()
        )));
    }

    let mut values = Vec::with_capacity(N_FEATURES);
    for raw in raw_inputs {
        let raw = raw.as_ref().trim();
        let value: f64 = raw.parse().map_err(|_| {
            CardioError::InvalidInput(format!("'{raw}' is not a valid numeric input"))
        })?;
        values.push(value);
    }

    Ok(Array1::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rendering() {
        let high = RiskAssessment {
            label: RiskLabel::High,
            probability: Some(0.873),
        };
        assert_eq!(high.to_string(), "High Risk (Probability: 0.87)");

        let low = RiskAssessment {
            label: RiskLabel::Low,
            probability: None,
        };
        assert_eq!(low.to_string(), "Low Risk");
    }

    #[test]
    fn test_parse_inputs_accepts_floats_and_whitespace() {
        let raw: Vec<String> = (0..N_FEATURES).map(|i| format!(" {i}.5 ")).collect();
        let parsed = parse_inputs(&raw).unwrap();
        assert_eq!(parsed.len(), N_FEATURES);
        assert_eq!(parsed[0], 0.5);
    }

    #[test]
    fn test_parse_inputs_rejects_non_numeric() {
        let mut raw: Vec<String> = (0..N_FEATURES).map(|i| i.to_string()).collect();
        raw[7] = "abc".to_string();
        assert!(matches!(
            parse_inputs(&raw),
            Err(CardioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_inputs_rejects_wrong_arity() {
        let raw = vec!["1.0"; 5];
        assert!(matches!(
            parse_inputs(&raw),
            Err(CardioError::InvalidInput(_))
        ));
    }
}
