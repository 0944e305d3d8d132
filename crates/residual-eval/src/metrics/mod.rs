//! Residual metrics for continuous targets.
//!
//! Every evaluation computes the full set of fifteen metrics from a shared
//! set of intermediate quantities (see [`residuals`]), then projects the
//! result down to the metrics the caller selected (see [`selection`]).
//!
//! # Available Metrics
//!
//! | Metric | Definition | Default |
//! |---|---|---|
//! | [`Metric::Mae`] | mean(\|residual\|) | on |
//! | [`Metric::Rmse`] | sqrt(mean(residual²)) | on |
//! | [`Metric::NrmseRng`] | RMSE / range(targets) | off |
//! | [`Metric::NrmseIqr`] | RMSE / IQR(targets) | on |
//! | [`Metric::NrmseStd`] | RMSE / sd(targets) | off |
//! | [`Metric::NrmseAvg`] | RMSE / mean(targets) | off |
//! | [`Metric::Rse`] | TSE / sum((target − mean)²) | off |
//! | [`Metric::Rrse`] | sqrt(RSE) | on |
//! | [`Metric::Rae`] | TAE / sum(\|target − mean\|) | on |
//! | [`Metric::Rmsle`] | sqrt(mean(log_error²)) | on |
//! | [`Metric::Male`] | mean(\|log_error\|) | off |
//! | [`Metric::Mape`] | mean(\|residual / target\|) | off |
//! | [`Metric::Mse`] | mean(residual²) | off |
//! | [`Metric::Tae`] | sum(\|residual\|) | off |
//! | [`Metric::Tse`] | sum(residual²) | off |
//!
//! where `residual = target − prediction` and
//! `log_error = ln(1 + prediction) − ln(1 + target)`.

pub mod residuals;
pub mod selection;
pub mod stats;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

pub use residuals::{compute_residual_metrics, residual_metrics, MetricsRecord};
pub use selection::{MetricConfig, MetricSet};

// =============================================================================
// Metric
// =============================================================================

/// One entry of the fixed metric universe.
///
/// Variants are declared in universe order, which is also the order of
/// output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Mean Absolute Error.
    #[serde(rename = "MAE")]
    Mae,
    /// Root Mean Squared Error.
    #[serde(rename = "RMSE")]
    Rmse,
    /// RMSE normalized by the target range.
    #[serde(rename = "NRMSE(RNG)")]
    NrmseRng,
    /// RMSE normalized by the target interquartile range.
    #[serde(rename = "NRMSE(IQR)")]
    NrmseIqr,
    /// RMSE normalized by the target standard deviation.
    #[serde(rename = "NRMSE(STD)")]
    NrmseStd,
    /// RMSE normalized by the target mean.
    #[serde(rename = "NRMSE(AVG)")]
    NrmseAvg,
    /// Relative Squared Error.
    #[serde(rename = "RSE")]
    Rse,
    /// Root Relative Squared Error.
    #[serde(rename = "RRSE")]
    Rrse,
    /// Relative Absolute Error.
    #[serde(rename = "RAE")]
    Rae,
    /// Root Mean Squared Log Error.
    #[serde(rename = "RMSLE")]
    Rmsle,
    /// Mean Absolute Log Error.
    #[serde(rename = "MALE")]
    Male,
    /// Mean Absolute Percentage Error (as a fraction, not multiplied by 100).
    #[serde(rename = "MAPE")]
    Mape,
    /// Mean Squared Error.
    #[serde(rename = "MSE")]
    Mse,
    /// Total Absolute Error.
    #[serde(rename = "TAE")]
    Tae,
    /// Total Squared Error.
    #[serde(rename = "TSE")]
    Tse,
}

impl Metric {
    /// Number of metrics in the universe.
    pub const COUNT: usize = 15;

    /// The whole universe, in output order.
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Mae,
        Metric::Rmse,
        Metric::NrmseRng,
        Metric::NrmseIqr,
        Metric::NrmseStd,
        Metric::NrmseAvg,
        Metric::Rse,
        Metric::Rrse,
        Metric::Rae,
        Metric::Rmsle,
        Metric::Male,
        Metric::Mape,
        Metric::Mse,
        Metric::Tae,
        Metric::Tse,
    ];

    /// Column label, e.g. `"NRMSE(IQR)"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mae => "MAE",
            Self::Rmse => "RMSE",
            Self::NrmseRng => "NRMSE(RNG)",
            Self::NrmseIqr => "NRMSE(IQR)",
            Self::NrmseStd => "NRMSE(STD)",
            Self::NrmseAvg => "NRMSE(AVG)",
            Self::Rse => "RSE",
            Self::Rrse => "RRSE",
            Self::Rae => "RAE",
            Self::Rmsle => "RMSLE",
            Self::Male => "MALE",
            Self::Mape => "MAPE",
            Self::Mse => "MSE",
            Self::Tae => "TAE",
            Self::Tse => "TSE",
        }
    }

    /// Position in the universe.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the metric is selected when the configuration doesn't mention it.
    pub fn default_enabled(self) -> bool {
        matches!(
            self,
            Self::Mae | Self::Rmse | Self::NrmseIqr | Self::Rrse | Self::Rae | Self::Rmsle
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    /// Parse an exact column label. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| EvalError::invalid_configuration(format!("unknown metric '{s}'")))
    }
}

// =============================================================================
// Tests
// =============================================================================
