//! NaN-excluding summary statistics.
//!
//! All functions skip NaN entries. A statistic over zero remaining values is
//! NaN, except [`nan_sum`] which is `0.0`.

use ndarray::ArrayView1;

fn non_missing<'a>(values: ArrayView1<'a, f64>) -> impl Iterator<Item = f64> + 'a {
    values.into_iter().copied().filter(|v| !v.is_nan())
}

/// Number of non-NaN values.
pub fn nan_count(values: ArrayView1<f64>) -> usize {
    non_missing(values).count()
}

/// Sum of non-NaN values.
pub fn nan_sum(values: ArrayView1<f64>) -> f64 {
    non_missing(values).sum()
}

/// Arithmetic mean of non-NaN values.
pub fn nan_mean(values: ArrayView1<f64>) -> f64 {
    let (sum, n) = non_missing(values).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Sample standard deviation (`n - 1` denominator) of non-NaN values.
///
/// NaN for fewer than two values.
pub fn nan_std(values: ArrayView1<f64>) -> f64 {
    let n = nan_count(values);
    if n < 2 {
        return f64::NAN;
    }
    let mean = nan_mean(values);
    let ss: f64 = non_missing(values).map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// `max - min` of non-NaN values.
pub fn nan_range(values: ArrayView1<f64>) -> f64 {
    let (min, max) = non_missing(values).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        f64::NAN
    } else {
        max - min
    }
}

/// Quantile of already-sorted, NaN-free values.
///
/// Linear interpolation between the order statistics around position
/// `(n - 1) * p` (the "type 7" definition).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&p));
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = h - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

/// Interquartile range (75th minus 25th percentile) of non-NaN values.
pub fn nan_iqr(values: ArrayView1<f64>) -> f64 {
    let mut sorted: Vec<f64> = non_missing(values).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25)
}

// =============================================================================
// Tests
// =============================================================================
