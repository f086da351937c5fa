//! Tukey-fence outlier detection.
//!
//! A value is an outlier when it falls strictly outside
//! `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]`, with quartiles computed by
//! [`quartiles`](super::descriptive::quartiles).

use super::descriptive::quartiles;

/// Multiplier applied to the IQR to place the fences.
pub const FENCE_FACTOR: f64 = 1.5;

/// Minimum series length before outliers are looked for.
pub const MIN_OUTLIER_LEN: usize = 4;

/// Lower and upper fence, or `None` for series shorter than [`MIN_OUTLIER_LEN`].
pub fn outlier_fences(series: &[f64]) -> Option<(f64, f64)> {
    if series.len() < MIN_OUTLIER_LEN {
        return None;
    }
    let q = quartiles(series)?;
    let iqr = q.iqr();
    Some((q.q1 - FENCE_FACTOR * iqr, q.q3 + FENCE_FACTOR * iqr))
}

/// Outlying values in the order they appear in `series`.
///
/// Short series yield an empty result rather than an error.
pub fn identify_outliers(series: &[f64]) -> Vec<f64> {
    let Some((lower, upper)) = outlier_fences(series) else {
        return Vec::new();
    };
    series
        .iter()
        .copied()
        .filter(|&v| v < lower || v > upper)
        .collect()
}
