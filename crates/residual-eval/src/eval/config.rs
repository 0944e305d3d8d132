//! Evaluation configuration with builder pattern.
//!
//! [`EvaluationConfig`] bundles everything [`evaluate_residuals`] needs
//! besides the dataset. It uses the `bon` crate for builder generation, with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use residual_eval::eval::EvaluationConfig;
//! use residual_eval::metrics::{Metric, MetricConfig};
//!
//! // Default metric selection
//! let config = EvaluationConfig::builder()
//!     .target_col("y")
//!     .prediction_col("y_hat")
//!     .build()
//!     .unwrap();
//!
//! // Only RMSE, missing values allowed, 4 worker threads
//! let config = EvaluationConfig::builder()
//!     .target_col("y")
//!     .prediction_col("y_hat")
//!     .metrics(MetricConfig::none().with(Metric::Rmse, true))
//!     .allow_missing(true)
//!     .n_threads(4)
//!     .build()
//!     .unwrap();
//! ```
//!
//! [`evaluate_residuals`]: super::evaluate_residuals

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::metrics::MetricConfig;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A column name is empty.
    #[error("{0} must not be empty")]
    EmptyColumnName(&'static str),

    /// Target and prediction refer to the same column.
    #[error("target_col and prediction_col must differ, both are '{0}'")]
    SameColumn(String),
}

// =============================================================================
// EvaluationConfig
// =============================================================================

/// Configuration for a residual evaluation.
///
/// Also (de)serializable, for callers that keep evaluation settings in JSON:
///
/// ```
/// use residual_eval::eval::EvaluationConfig;
///
/// let config: EvaluationConfig = serde_json::from_str(
///     r#"{"target_col": "y", "prediction_col": "p", "metrics": "all"}"#,
/// )
/// .unwrap();
/// assert_eq!(config.metrics.resolve().len(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EvaluationConfig {
    /// Name of the numeric target column.
    #[builder(into)]
    pub target_col: String,

    /// Name of the numeric prediction column.
    #[builder(into)]
    pub prediction_col: String,

    /// Which metrics to emit. Default: the per-metric defaults.
    #[builder(default)]
    #[serde(default)]
    pub metrics: MetricConfig,

    /// Accept missing (NaN) targets and predictions. Default: `false`.
    #[builder(default)]
    #[serde(default)]
    pub allow_missing: bool,

    /// Return all-NA metrics without computing anything. Default: `false`.
    #[builder(default)]
    #[serde(default)]
    pub return_placeholder: bool,

    /// Number of worker threads: 0 = auto, 1 = sequential. Default: 0.
    #[builder(default)]
    #[serde(default)]
    pub n_threads: usize,
}

/// Custom finishing function that validates the config.
impl<S: evaluation_config_builder::IsComplete> EvaluationConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a column name is empty or both column
    /// names are the same.
    pub fn build(self) -> Result<EvaluationConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EvaluationConfig {
    /// Validate the configuration.
    ///
    /// Called by the builder; call it yourself on deserialized configs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_col.is_empty() {
            return Err(ConfigError::EmptyColumnName("target_col"));
        }
        if self.prediction_col.is_empty() {
            return Err(ConfigError::EmptyColumnName("prediction_col"));
        }
        if self.target_col == self.prediction_col {
            return Err(ConfigError::SameColumn(self.target_col.clone()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
