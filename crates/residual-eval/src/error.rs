//! Error types for evaluation.

use crate::data::DatasetError;
use crate::eval::ConfigError;

/// Errors raised while resolving metrics or evaluating a dataset.
///
/// Numerically degenerate results (zero denominators, undefined logarithms)
/// are not errors; they show up as infinities or NaN inside an otherwise
/// successful result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The metric configuration is malformed.
    #[error("invalid metric configuration: {0}")]
    InvalidConfiguration(String),

    /// A column expected to be numeric holds another type.
    #[error("'{column}' must be numeric, got {found}")]
    TypeError {
        column: String,
        found: &'static str,
    },

    /// Predictions and targets differ in length.
    #[error("predictions and targets must have the same length, got {predictions} and {targets}")]
    LengthMismatch { predictions: usize, targets: usize },

    /// Predictions and targets are empty.
    #[error("predictions and targets must contain at least one element")]
    EmptyInput,

    /// A referenced column does not exist in the dataset.
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Missing values were found while `allow_missing` is off.
    #[error("column '{column}' contains {count} missing value(s)")]
    MissingValues { column: String, count: usize },

    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EvalError {
    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

impl From<rayon::ThreadPoolBuildError> for EvalError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
