//! The residual metrics engine.
//!
//! [`compute_residual_metrics`] turns one prediction vector and one target
//! vector into a full [`MetricsRecord`]. All fifteen metrics are derived from
//! a handful of shared intermediates (target summary statistics, residuals,
//! centered targets), so they are always computed together.
//!
//! # Missing Values
//!
//! Missing values (NaN) are excluded pairwise from every aggregate, with two
//! exceptions: MAPE and the log-error family (RMSLE, MALE) average over all
//! pairs, so a single missing value turns them into NaN.
//!
//! # Degenerate Inputs
//!
//! Zero denominators are not trapped: they yield infinities or NaN under
//! IEEE rules. If any `1 + value` among the non-missing predictions and
//! targets is `<= 0`, the log error is undefined and RMSLE and MALE are NaN.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::trace;

use super::stats::{nan_iqr, nan_mean, nan_range, nan_std, nan_sum};
use super::{Metric, MetricSet};
use crate::data::Column;
use crate::error::EvalError;

// =============================================================================
// MetricsRecord
// =============================================================================

/// Values of all fifteen metrics, in universe order.
///
/// `None` is the NA sentinel used by placeholder records; `Some(f64::NAN)` is
/// a NaN produced by computation.
#[derive(Clone, Copy, PartialEq)]
pub struct MetricsRecord {
    values: [Option<f64>; Metric::COUNT],
}

impl MetricsRecord {
    /// A record with every metric set to NA.
    pub fn placeholder() -> Self {
        Self {
            values: [None; Metric::COUNT],
        }
    }

    /// Whether every metric is NA.
    pub fn is_placeholder(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Value of one metric; `None` means NA.
    #[inline]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values[metric.index()]
    }

    /// Value of one metric, with NA mapped to NaN.
    #[inline]
    pub fn value(&self, metric: Metric) -> f64 {
        self.get(metric).unwrap_or(f64::NAN)
    }

    /// All `(metric, value)` pairs in universe order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    /// Values of the metrics in `selected`, in universe order.
    pub fn project(&self, selected: &MetricSet) -> Vec<Option<f64>> {
        selected.iter().map(|m| self.get(m)).collect()
    }

    fn set(&mut self, metric: Metric, value: f64) {
        self.values[metric.index()] = Some(value);
    }
}

impl fmt::Debug for MetricsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(m, v)| (m.name(), v))).finish()
    }
}

impl Serialize for MetricsRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.name(), &value)?;
        }
        map.end()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Compute all metrics for one group, validating column types first.
///
/// With `return_placeholder` set, no validation or arithmetic happens and
/// the all-NA record is returned.
///
/// # Errors
///
/// - [`EvalError::TypeError`] if either column is not numeric
/// - [`EvalError::LengthMismatch`] if the lengths differ
/// - [`EvalError::EmptyInput`] if both are empty
pub fn residual_metrics(
    predictions: &Column,
    targets: &Column,
    return_placeholder: bool,
) -> Result<MetricsRecord, EvalError> {
    if return_placeholder {
        return Ok(MetricsRecord::placeholder());
    }
    let predictions = numeric(predictions, "predictions")?;
    let targets = numeric(targets, "targets")?;
    compute_residual_metrics(predictions, targets)
}

fn numeric<'a>(column: &'a Column, role: &str) -> Result<ArrayView1<'a, f64>, EvalError> {
    column.as_numeric().ok_or_else(|| EvalError::TypeError {
        column: role.to_owned(),
        found: column.type_name(),
    })
}

/// Compute all metrics from numeric predictions and targets.
///
/// # Errors
///
/// - [`EvalError::LengthMismatch`] if the lengths differ
/// - [`EvalError::EmptyInput`] if both are empty
pub fn compute_residual_metrics(
    predictions: ArrayView1<f64>,
    targets: ArrayView1<f64>,
) -> Result<MetricsRecord, EvalError> {
    if predictions.len() != targets.len() {
        return Err(EvalError::LengthMismatch {
            predictions: predictions.len(),
            targets: targets.len(),
        });
    }
    if targets.is_empty() {
        return Err(EvalError::EmptyInput);
    }

    // Target summary statistics
    let targets_mean = nan_mean(targets);
    let targets_range = nan_range(targets);
    let targets_iqr = nan_iqr(targets);
    let targets_std = nan_std(targets);

    // Residuals
    let residuals: Array1<f64> = &targets - &predictions;
    let abs_residuals = residuals.mapv(f64::abs);
    let squared_residuals = residuals.mapv(|r| r * r);

    // Centered targets
    let centered = targets.mapv(|t| t - targets_mean);
    let abs_centered = centered.mapv(f64::abs);
    let squared_centered = centered.mapv(|c| c * c);

    let tae = nan_sum(abs_residuals.view());
    let tse = nan_sum(squared_residuals.view());
    let mae = nan_mean(abs_residuals.view());
    let mse = nan_mean(squared_residuals.view());
    let rmse = mse.sqrt();
    let rse = tse / nan_sum(squared_centered.view());

    // No missing-value exclusion from here on.
    let mape = (&residuals / &targets).mapv(f64::abs).mean().unwrap_or(f64::NAN);
    let log_error = log_errors(predictions, targets);
    let rmsle = log_error.mapv(|e| e * e).mean().unwrap_or(f64::NAN).sqrt();
    let male = log_error.mapv(f64::abs).mean().unwrap_or(f64::NAN);

    let mut record = MetricsRecord::placeholder();
    record.set(Metric::Mae, mae);
    record.set(Metric::Rmse, rmse);
    record.set(Metric::NrmseRng, rmse / targets_range);
    record.set(Metric::NrmseIqr, rmse / targets_iqr);
    record.set(Metric::NrmseStd, rmse / targets_std);
    record.set(Metric::NrmseAvg, rmse / targets_mean);
    record.set(Metric::Rse, rse);
    record.set(Metric::Rrse, rse.sqrt());
    record.set(Metric::Rae, tae / nan_sum(abs_centered.view()));
    record.set(Metric::Rmsle, rmsle);
    record.set(Metric::Male, male);
    record.set(Metric::Mape, mape);
    record.set(Metric::Mse, mse);
    record.set(Metric::Tae, tae);
    record.set(Metric::Tse, tse);
    Ok(record)
}

/// `ln(1 + prediction) - ln(1 + target)` per pair.
///
/// Collapses to a single NaN when any logarithm is undefined.
fn log_errors(predictions: ArrayView1<f64>, targets: ArrayView1<f64>) -> Array1<f64> {
    let undefined = predictions.iter().chain(targets.iter()).any(|&v| 1.0 + v <= 0.0);
    if undefined {
        trace!("log error undefined for a value <= -1");
        return Array1::from_elem(1, f64::NAN);
    }
    predictions.mapv(f64::ln_1p) - targets.mapv(f64::ln_1p)
}

// =============================================================================
// Tests
// =============================================================================
