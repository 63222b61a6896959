//! Error types for the cardioml crate

use thiserror::Error;

/// Result type alias for cardioml operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type. Every operation boundary returns one of these; callers
/// branch on the variant rather than parsing message text.
#[derive(Error, Debug)]
pub enum CardioError {
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Unknown model name: {0}")]
    UnknownModel(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fit failure: {0}")]
    FitFailure(String),

    #[error("Model not fitted")]
    NotFitted,

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for CardioError {
    fn from(err: polars::error::PolarsError) -> Self {
        CardioError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CardioError {
    fn from(err: serde_json::Error) -> Self {
        CardioError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for CardioError {
    fn from(err: bincode::Error) -> Self {
        CardioError::SerializationError(err.to_string())
    }
}
