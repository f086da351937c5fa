//! Descriptive statistics over a plain series of fiscal values.
//!
//! Every function takes `&[f64]` and never mutates it. Results that are
//! mathematically undefined for the given input come back as `None`; a `Some(0.0)`
//! always means a genuine zero.
//!
//! Conventions worth knowing before using these numbers:
//! - variance and standard deviation are **sample** statistics (divisor `n − 1`)
//! - quartiles split the sorted series at the midpoint and drop the middle element
//!   for odd lengths (Tukey hinges without the shared median)

use std::collections::HashMap;

/// Arithmetic mean.
pub fn mean(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    Some(series.iter().sum::<f64>() / series.len() as f64)
}

/// Median of a sorted copy; even lengths average the two middle elements.
pub fn median(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    Some(median_of_sorted(&sorted_copy(series)))
}

/// Most frequent value.
///
/// Ties resolve to the value seen first in input order. When every value of a
/// series with two or more elements is unique there is no mode.
pub fn mode(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &v in series {
        *counts.entry(value_key(v)).or_insert(0) += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    if max_count == 1 && series.len() > 1 {
        return None;
    }

    series
        .iter()
        .copied()
        .find(|&v| counts.get(&value_key(v)).copied() == Some(max_count))
}

/// Sample variance (divisor `n − 1`).
pub fn variance(series: &[f64]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let m = mean(series)?;
    let ss: f64 = series.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (series.len() as f64 - 1.0))
}

/// Sample standard deviation.
pub fn std_dev(series: &[f64]) -> Option<f64> {
    variance(series).map(f64::sqrt)
}

pub fn min(series: &[f64]) -> Option<f64> {
    series.iter().copied().reduce(f64::min)
}

pub fn max(series: &[f64]) -> Option<f64> {
    series.iter().copied().reduce(f64::max)
}

/// `max − min`.
pub fn range(series: &[f64]) -> Option<f64> {
    Some(max(series)? - min(series)?)
}

/// Lower quartile, median and upper quartile.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quartiles using the exclude-middle split.
///
/// After sorting, Q2 is the median of the whole series, Q1 the median of the
/// elements strictly before the midpoint and Q3 the median of the elements
/// strictly after it. For odd lengths the middle element belongs to neither half.
/// Requires at least 3 elements.
pub fn quartiles(series: &[f64]) -> Option<Quartiles> {
    let n = series.len();
    if n < 3 {
        return None;
    }

    let sorted = sorted_copy(series);
    let mid = n / 2;
    let lower = &sorted[..mid];
    let upper = if n % 2 == 0 {
        &sorted[mid..]
    } else {
        &sorted[mid + 1..]
    };

    Some(Quartiles {
        q1: median_of_sorted(lower),
        q2: median_of_sorted(&sorted),
        q3: median_of_sorted(upper),
    })
}

/// Interquartile range `Q3 − Q1`.
pub fn iqr(series: &[f64]) -> Option<f64> {
    quartiles(series).map(|q| q.iqr())
}

/// `std_dev / mean × 100`.
///
/// The sign follows the mean, so a series of deficits yields a negative value.
/// `None` when the mean is zero or the ratio is not finite.
pub fn coefficient_of_variation(series: &[f64]) -> Option<f64> {
    let m = mean(series)?;
    if m == 0.0 {
        return None;
    }
    let cv = std_dev(series)? / m * 100.0;
    cv.is_finite().then_some(cv)
}

/// Means of each contiguous window of `window` elements.
///
/// The output has `len − window + 1` elements.
pub fn moving_average(series: &[f64], window: usize) -> Option<Vec<f64>> {
    if window == 0 || window > series.len() {
        return None;
    }
    let out = series
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();
    Some(out)
}

/// Standard score of `value` relative to `series`.
pub fn z_score(value: f64, series: &[f64]) -> Option<f64> {
    let sd = std_dev(series)?;
    if sd == 0.0 {
        return None;
    }
    Some((value - mean(series)?) / sd)
}

/// Year-over-year percentage change between consecutive elements.
///
/// A zero base followed by a non-zero value has no percentage (`None`);
/// zero followed by zero is a 0% change.
pub fn growth_rates(series: &[f64]) -> Vec<Option<f64>> {
    series
        .windows(2)
        .map(|w| {
            let (prev, next) = (w[0], w[1]);
            if prev == 0.0 {
                if next == 0.0 { Some(0.0) } else { None }
            } else {
                Some((next - prev) / prev.abs() * 100.0)
            }
        })
        .collect()
}

fn sorted_copy(series: &[f64]) -> Vec<f64> {
    let mut sorted = series.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

// `-0.0` and `0.0` must count as the same value.
fn value_key(v: f64) -> u64 {
    (v + 0.0).to_bits()
}
