//! residual-eval: grouped, NaN-aware regression residual metrics.
//!
//! Computes fifteen residual metrics (MAE, RMSE, normalized RMSE variants,
//! relative errors, log errors, MAPE and totals) over prediction/target
//! pairs, for a whole dataset or for every group of a grouped dataset.
//!
//! # Key Types
//!
//! - [`Dataset`] - Named columns with optional grouping columns
//! - [`Metric`] / [`MetricSet`] / [`MetricConfig`] - Metric identifiers and selection
//! - [`EvaluationConfig`] - Configuration builder
//! - [`MetricsTable`] - One row of metrics per group
//!
//! # Evaluating
//!
//! Build an [`EvaluationConfig`] and call [`evaluate_residuals`], or call
//! [`eval::evaluate`] directly with a resolved [`MetricSet`]. The single-pair
//! engine is [`metrics::compute_residual_metrics`].
//!
//! # Logging
//!
//! Diagnostics go through `tracing`; install a subscriber to see them.

// Re-export approx traits for users who want to compare metrics
pub use approx;

pub mod data;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Evaluation entry points and configuration
pub use eval::{evaluate_residuals, ConfigError, EvaluationConfig, MetricsRow, MetricsTable};

// Metrics
pub use metrics::{
    compute_residual_metrics, residual_metrics, Metric, MetricConfig, MetricSet, MetricsRecord,
};

// Data types
pub use data::{Column, Dataset, DatasetBuilder, DatasetError, GroupKey, GroupValue};

pub use error::EvalError;

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
