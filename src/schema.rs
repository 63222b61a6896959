//! The fixed feature schema every dataset must satisfy
//!
//! Sixteen named numeric feature columns plus one binary label column.
//! Column order is fixed and must match between training and prediction.

/// Feature columns in schema order.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "age",
    "gender",
    "blood_pressure",
    "cholesterol",
    "blood_sugar",
    "restecg",
    "max_heart_rate",
    "exang",
    "st_depression",
    "slope",
    "ca",
    "thal",
    "smoking_habits",
    "cp_1",
    "cp_2",
    "cp_3",
];

/// Binary label column: 0 = no disease, 1 = disease.
pub const LABEL_COLUMN: &str = "heart_disease";

/// Number of feature columns.
pub const N_FEATURES: usize = FEATURE_COLUMNS.len();

/// All columns a dataset must carry: the 16 features plus the label.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    FEATURE_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(LABEL_COLUMN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_arity() {
        assert_eq!(N_FEATURES, 16);
        assert_eq!(required_columns().count(), 17);
    }

    #[test]
    fn test_label_not_a_feature() {
        assert!(!FEATURE_COLUMNS.contains(&LABEL_COLUMN));
    }
}
