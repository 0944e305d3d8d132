//! Test and benchmark helpers.

use rand::prelude::*;

use crate::data::Dataset;

/// Default absolute tolerance for comparing computed metrics.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Name of the grouping column in [`synthetic_grouped_dataset`].
pub const GROUP_COL: &str = "group";
/// Name of the target column in [`synthetic_grouped_dataset`].
pub const TARGET_COL: &str = "target";
/// Name of the prediction column in [`synthetic_grouped_dataset`].
pub const PREDICTION_COL: &str = "prediction";

/// Generate `(targets, predictions)` with targets uniform in `[0, 10)` and
/// predictions off by uniform noise in `[-noise, noise)`.
pub fn synthetic_pairs(n: usize, seed: u64, noise: f64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let targets: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() * 10.0).collect();
    let predictions = targets
        .iter()
        .map(|t| t + (rng.r#gen::<f64>() * 2.0 - 1.0) * noise)
        .collect();
    (targets, predictions)
}

/// Build a dataset of `n_groups * rows_per_group` rows grouped by a text column.
///
/// Rows are interleaved (row `i` belongs to group `i % n_groups`) and group
/// labels are assigned in descending order, so the input order never matches
/// the canonical group order.
pub fn synthetic_grouped_dataset(n_groups: usize, rows_per_group: usize, seed: u64) -> Dataset {
    let n = n_groups * rows_per_group;
    let (targets, predictions) = synthetic_pairs(n, seed, 0.5);
    let labels: Vec<String> = (0..n)
        .map(|i| format!("g{:04}", n_groups - 1 - i % n_groups.max(1)))
        .collect();

    Dataset::builder()
        .add_text(GROUP_COL, labels)
        .add_numeric(TARGET_COL, targets)
        .add_numeric(PREDICTION_COL, predictions)
        .group_by([GROUP_COL])
        .build()
        .expect("synthetic dataset columns are consistent")
}
