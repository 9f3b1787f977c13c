use thiserror::Error;

use crate::math::ShapeError;

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors raised while fitting or applying column transformations.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Columns required by the transformer are absent from the input table.
    #[error("missing columns in input table: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A transformer was used before `fit` completed.
    #[error("{0} has not been fitted yet")]
    NotFitted(String),

    #[error("invalid value in column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    /// A supervised encoder was fitted without a target.
    #[error("{0} requires a target to fit")]
    MissingTarget(String),

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("unknown category '{category}' in column '{column}'")]
    UnknownCategory { column: String, category: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<ShapeError> for FeatureError {
    fn from(err: ShapeError) -> Self {
        FeatureError::ShapeMismatch {
            expected: "consistent matrix shape".to_string(),
            got: err.to_string(),
        }
    }
}
