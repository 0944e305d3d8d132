//! Grouped evaluation.
//!
//! [`evaluate`] validates the target and prediction columns once, partitions
//! the dataset by its grouping columns, runs the residual metrics engine on
//! every group and assembles a [`MetricsTable`].
//!
//! # Ordering
//!
//! The row partition comes from one stable sort by group key (see
//! [`Partition`]). Target and prediction values are gathered in that order
//! once, every group is a contiguous slice of the gathered arrays, and group
//! keys are read from the same partition. Output rows are therefore always in
//! ascending key order and always aligned with their metrics, whether groups
//! were evaluated sequentially or in parallel.
//!
//! [`Partition`]: crate::data::Partition

mod config;
mod table;

pub use config::{ConfigError, EvaluationConfig, EvaluationConfigBuilder};
pub use table::{MetricsRow, MetricsTable};

use ndarray::{s, Array1, ArrayView1, Axis};
use tracing::{debug, trace, warn};

use crate::data::{Dataset, DatasetError};
use crate::error::EvalError;
use crate::metrics::{compute_residual_metrics, MetricSet, MetricsRecord};
use crate::utils::{run_with_threads, Parallelism};

/// Evaluate residual metrics per group.
///
/// Returns one row per group (one row in total for an ungrouped dataset),
/// with the grouping columns followed by the metrics in `metrics`.
///
/// With `return_placeholder` set, every group gets an all-NA row and no
/// metric is computed. Column validation still runs.
///
/// # Errors
///
/// - [`EvalError::ColumnNotFound`] if a column doesn't exist
/// - [`EvalError::TypeError`] if a column isn't numeric
/// - [`EvalError::MissingValues`] if `allow_missing` is false and a column has NaN
/// - [`EvalError::Dataset`] if a grouping column is named like a selected
///   metric, since output columns must be unique
/// - [`EvalError::EmptyInput`] if a group has no rows (only possible for an
///   empty, ungrouped dataset)
///
/// No partial table is returned on error.
pub fn evaluate(
    dataset: &Dataset,
    target_col: &str,
    prediction_col: &str,
    metrics: &MetricSet,
    allow_missing: bool,
    return_placeholder: bool,
    parallelism: Parallelism,
) -> Result<MetricsTable, EvalError> {
    let targets = numeric_column(dataset, target_col, allow_missing)?;
    let predictions = numeric_column(dataset, prediction_col, allow_missing)?;
    if let Some(name) = dataset
        .group_columns()
        .iter()
        .find(|name| metrics.iter().any(|m| m.name() == name.as_str()))
    {
        return Err(DatasetError::GroupColumnClash(name.clone()).into());
    }

    let partition = dataset.partition();
    debug!(
        n_rows = dataset.n_rows(),
        n_groups = partition.n_groups(),
        group_by = ?dataset.group_columns(),
        metrics = ?metrics.names(),
        "evaluating residual metrics"
    );
    if return_placeholder {
        warn!("placeholder mode: emitting NA metrics for every group");
    }

    // Gather once in canonical order; groups are ranges into these arrays.
    let targets: Array1<f64> = targets.select(Axis(0), partition.order());
    let predictions: Array1<f64> = predictions.select(Axis(0), partition.order());

    let records = parallelism.maybe_par_try_map(partition.groups(), |group| {
        trace!(key = ?group.key, n_rows = group.len(), "evaluating group");
        if return_placeholder {
            return Ok(MetricsRecord::placeholder());
        }
        let rows = group.rows.clone();
        compute_residual_metrics(
            predictions.slice(s![rows.clone()]),
            targets.slice(s![rows]),
        )
    })?;

    let keys = partition.groups().iter().map(|g| g.key.clone());
    Ok(MetricsTable::from_records(
        dataset.group_columns().to_vec(),
        *metrics,
        keys.zip(records),
    ))
}

/// Evaluate residual metrics as described by `config`.
///
/// Resolves the metric selection, sets up the worker pool for
/// `config.n_threads` and calls [`evaluate`].
///
/// # Example
///
/// ```
/// use residual_eval::data::Dataset;
/// use residual_eval::eval::{evaluate_residuals, EvaluationConfig};
/// use residual_eval::metrics::{Metric, MetricConfig};
///
/// let ds = Dataset::builder()
///     .add_text("fold", vec!["b", "a", "b", "a"])
///     .add_numeric("y", vec![1.0, 2.0, 3.0, 4.0])
///     .add_numeric("pred", vec![1.0, 2.0, 3.0, 5.0])
///     .group_by(["fold"])
///     .build()
///     .unwrap();
///
/// let config = EvaluationConfig::builder()
///     .target_col("y")
///     .prediction_col("pred")
///     .metrics(MetricConfig::none().with(Metric::Mae, true))
///     .build()
///     .unwrap();
///
/// let table = evaluate_residuals(&ds, &config).unwrap();
/// assert_eq!(table.column_names(), ["fold", "MAE"]);
/// assert_eq!(table.metric_column(Metric::Mae), Some(vec![Some(0.5), Some(0.0)]));
/// ```
///
/// # Errors
///
/// Any error of [`evaluate`], plus [`EvalError::Config`] for an invalid
/// config and [`EvalError::ThreadPool`] if the pool can't be built.
pub fn evaluate_residuals(
    dataset: &Dataset,
    config: &EvaluationConfig,
) -> Result<MetricsTable, EvalError> {
    config.validate()?;
    let metrics = config.metrics.resolve();
    run_with_threads(config.n_threads, |parallelism| {
        evaluate(
            dataset,
            &config.target_col,
            &config.prediction_col,
            &metrics,
            config.allow_missing,
            config.return_placeholder,
            parallelism,
        )
    })?
}

fn numeric_column<'a>(
    dataset: &'a Dataset,
    name: &str,
    allow_missing: bool,
) -> Result<ArrayView1<'a, f64>, EvalError> {
    let column = dataset
        .column(name)
        .ok_or_else(|| EvalError::ColumnNotFound(name.to_owned()))?;
    let values = column.as_numeric().ok_or_else(|| EvalError::TypeError {
        column: name.to_owned(),
        found: column.type_name(),
    })?;
    if !allow_missing {
        let count = column.n_missing();
        if count > 0 {
            return Err(EvalError::MissingValues {
                column: name.to_owned(),
                count,
            });
        }
    }
    Ok(values)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GroupValue;
    use crate::metrics::{Metric, MetricsRecord};
    use crate::testing::DEFAULT_TOLERANCE;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn ungrouped() -> Dataset {
        Dataset::builder()
            .add_numeric("y", vec![1.0, 2.0, 3.0, 4.0])
            .add_numeric("p", vec![1.0, 2.0, 3.0, 5.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_ungrouped_is_single_row_matching_engine() {
        let table = evaluate(
            &ungrouped(),
            "y",
            "p",
            &MetricSet::all(),
            false,
            false,
            Parallelism::Sequential,
        )
        .unwrap();

        assert_eq!(table.n_rows(), 1);
        assert!(table.rows()[0].key.is_empty());
        let expected = compute_residual_metrics(
            array![1.0, 2.0, 3.0, 5.0].view(),
            array![1.0, 2.0, 3.0, 4.0].view(),
        )
        .unwrap();
        assert_eq!(table.rows()[0].values, expected.project(&MetricSet::all()));
    }

    #[test]
    fn test_projection_to_requested_metrics() {
        let metrics = MetricSet::from_names(&["RMSE", "MAE"]).unwrap();
        let table = evaluate(&ungrouped(), "y", "p", &metrics, false, false, Parallelism::Sequential)
            .unwrap();
        assert_eq!(table.column_names(), ["MAE", "RMSE"]);
        assert_abs_diff_eq!(table.rows()[0].values[0].unwrap(), 0.25, epsilon = DEFAULT_TOLERANCE);
        assert_abs_diff_eq!(table.rows()[0].values[1].unwrap(), 0.5, epsilon = DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_groups_emitted_in_key_order() {
        let ds = Dataset::builder()
            .add_text("fold", vec!["B", "A", "B", "A"])
            .add_numeric("y", vec![1.0, 1.0, 1.0, 1.0])
            .add_numeric("p", vec![3.0, 1.5, 3.0, 1.5])
            .group_by(["fold"])
            .build()
            .unwrap();

        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let metrics = MetricSet::from_names(&["MAE"]).unwrap();
            let table = evaluate(&ds, "y", "p", &metrics, false, false, parallelism).unwrap();
            assert_eq!(table.column_names(), ["fold", "MAE"]);
            assert_eq!(
                table.group_column("fold").unwrap(),
                [&GroupValue::from("A"), &GroupValue::from("B")]
            );
            assert_eq!(table.metric_column(Metric::Mae), Some(vec![Some(0.5), Some(2.0)]));
        }
    }

    #[test]
    fn test_missing_values_rejected_unless_allowed() {
        let ds = Dataset::builder()
            .add_numeric("y", vec![1.0, f64::NAN, 3.0])
            .add_numeric("p", vec![1.0, 2.0, 4.0])
            .build()
            .unwrap();
        let metrics = MetricSet::defaults();

        let err = evaluate(&ds, "y", "p", &metrics, false, false, Parallelism::Sequential)
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::MissingValues {
                column: "y".into(),
                count: 1
            }
        );

        let table =
            evaluate(&ds, "y", "p", &metrics, true, false, Parallelism::Sequential).unwrap();
        let mae = table.metric_column(Metric::Mae).unwrap()[0].unwrap();
        assert_abs_diff_eq!(mae, 0.5, epsilon = DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_column_errors() {
        let ds = Dataset::builder()
            .add_numeric("y", vec![1.0])
            .add_text("p", vec!["x"])
            .build()
            .unwrap();
        let metrics = MetricSet::defaults();

        let err = evaluate(&ds, "nope", "p", &metrics, false, false, Parallelism::Sequential)
            .unwrap_err();
        assert_eq!(err, EvalError::ColumnNotFound("nope".into()));

        let err =
            evaluate(&ds, "y", "p", &metrics, false, false, Parallelism::Sequential).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { ref column, found: "text" } if column == "p"));
    }

    #[test]
    fn test_placeholder_rows_are_all_na() {
        let ds = ungrouped().regroup(["y"]).unwrap();
        let table = evaluate(&ds, "y", "p", &MetricSet::all(), false, true, Parallelism::Parallel)
            .unwrap();
        assert_eq!(table.n_rows(), 4);
        for row in table.rows() {
            assert_eq!(row.values, MetricsRecord::placeholder().project(&MetricSet::all()));
        }
    }

    #[test]
    fn test_empty_ungrouped_dataset() {
        let ds = Dataset::builder()
            .add_numeric("y", Vec::<f64>::new())
            .add_numeric("p", Vec::<f64>::new())
            .build()
            .unwrap();
        let metrics = MetricSet::defaults();

        let err = evaluate(&ds, "y", "p", &metrics, false, false, Parallelism::Sequential)
            .unwrap_err();
        assert_eq!(err, EvalError::EmptyInput);

        let table =
            evaluate(&ds, "y", "p", &metrics, false, true, Parallelism::Sequential).unwrap();
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn test_evaluate_residuals_uses_config() {
        let config = EvaluationConfig::builder()
            .target_col("y")
            .prediction_col("p")
            .metrics(crate::metrics::MetricConfig::all())
            .n_threads(2)
            .build()
            .unwrap();
        let table = evaluate_residuals(&ungrouped(), &config).unwrap();
        assert_eq!(table.column_names().len(), Metric::COUNT);

        let bad = EvaluationConfig {
            prediction_col: "y".into(),
            ..config
        };
        assert!(matches!(
            evaluate_residuals(&ungrouped(), &bad),
            Err(EvalError::Config(ConfigError::SameColumn(_)))
        ));
    }

    #[test]
    fn test_group_column_named_like_metric_is_rejected() {
        let ds = Dataset::builder()
            .add_text("MAE", vec!["a", "b"])
            .add_numeric("y", vec![1.0, 2.0])
            .add_numeric("p", vec![1.0, 3.0])
            .group_by(["MAE"])
            .build()
            .unwrap();

        let err = evaluate(&ds, "y", "p", &MetricSet::all(), false, false, Parallelism::Sequential)
            .unwrap_err();
        assert_eq!(err, EvalError::Dataset(DatasetError::GroupColumnClash("MAE".into())));

        // Fine when that metric is not selected.
        let metrics = MetricSet::from_names(&["RMSE"]).unwrap();
        let table =
            evaluate(&ds, "y", "p", &metrics, false, false, Parallelism::Sequential).unwrap();
        assert_eq!(table.column_names(), ["MAE", "RMSE"]);
    }
}
