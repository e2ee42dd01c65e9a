//! NaN-aware summary statistics.
//!
//! NaN samples are skipped. A sequence with no finite-or-infinite samples
//! left yields NaN. Standard deviations are population (ddof = 0).

/// Mean of the non-NaN values.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));

    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Population standard deviation of the non-NaN values.
pub fn nan_std<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let mean = nan_mean(iter.clone());
    if mean.is_nan() {
        return f64::NAN;
    }

    let (sum_sq, count) = iter
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + (v - mean) * (v - mean), n + 1));

    (sum_sq / count as f64).sqrt()
}

/// Per-column mean of a row-major matrix.
pub fn column_mean(rows: &[Vec<f64>], columns: usize) -> Vec<f64> {
    (0..columns)
        .map(|j| nan_mean(rows.iter().map(|row| row[j])))
        .collect()
}

/// Per-column population standard deviation of a row-major matrix.
pub fn column_std(rows: &[Vec<f64>], columns: usize) -> Vec<f64> {
    (0..columns)
        .map(|j| nan_std(rows.iter().map(|row| row[j])))
        .collect()
}
