//! Pearson correlation and simple (one-regressor) ordinary least squares.
//!
//! Both routines work on paired sequences `x`, `y`. A length mismatch is a
//! caller bug and fails fast with an `AppError`; degenerate but well-formed input
//! (fewer than two points, a flat sequence) yields `Ok(None)`.
//!
//! In this crate `x` is nearly always a run of consecutive fiscal years and `y` a
//! fiscal metric, so the regression slope reads as "average annual change".

use serde::Serialize;

use crate::domain::{FiscalSeries, FiscalYear};
use crate::error::AppError;
use crate::stats::descriptive::mean;

/// A fitted line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Centered cross-products `(Sxx, Syy, Sxy)`.
fn centered_sums(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    let x_mean = mean(x)?;
    let y_mean = mean(y)?;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    Some((sxx, syy, sxy))
}

fn check_pair(what: &str, x: &[f64], y: &[f64]) -> Result<(), AppError> {
    if x.len() != y.len() {
        return Err(AppError::length_mismatch(what, x.len(), y.len()));
    }
    Ok(())
}

/// Pearson product-moment correlation.
///
/// Returns `Ok(None)` for fewer than two points or when either sequence has
/// zero variance. The result is clamped to `[-1, 1]`.
pub fn correlation(x: &[f64], y: &[f64]) -> Result<Option<f64>, AppError> {
    check_pair("correlation", x, y)?;
    if x.len() < 2 {
        return Ok(None);
    }
    let Some((sxx, syy, sxy)) = centered_sums(x, y) else {
        return Ok(None);
    };
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Ok(None);
    }
    Ok(Some((sxy / denom).clamp(-1.0, 1.0)))
}

/// Ordinary least squares fit of `y` on `x`.
///
/// `slope = Σ(xᵢ−x̄)(yᵢ−ȳ) / Σ(xᵢ−x̄)²`, `intercept = ȳ − slope·x̄`.
/// Returns `Ok(None)` for fewer than two points or when `x` is constant.
/// A constant `y` is fine and fits a flat line.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<Option<RegressionResult>, AppError> {
    check_pair("linear regression", x, y)?;
    if x.len() < 2 {
        return Ok(None);
    }
    let Some((sxx, _, sxy)) = centered_sums(x, y) else {
        return Ok(None);
    };
    if sxx == 0.0 {
        return Ok(None);
    }
    let (Some(x_mean), Some(y_mean)) = (mean(x), mean(y)) else {
        return Ok(None);
    };
    let slope = sxy / sxx;
    Ok(Some(RegressionResult {
        slope,
        intercept: y_mean - slope * x_mean,
    }))
}

/// Linear trend of a fiscal series against its years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendFit {
    pub line: RegressionResult,
    /// Correlation between year and value; `None` when the values are flat.
    pub correlation: Option<f64>,
    pub first_year: FiscalYear,
    pub last_year: FiscalYear,
}

impl TrendFit {
    /// Slope of the fitted line, in value units per year.
    pub fn average_annual_change(&self) -> f64 {
        self.line.slope
    }

    /// Straight-line extrapolation (or interpolation) to `year`.
    pub fn project(&self, year: FiscalYear) -> f64 {
        self.line.predict(f64::from(year))
    }
}

/// Fit a linear trend through `series`.
///
/// `FiscalSeries` guarantees paired lengths, so the only failure mode is a
/// degenerate series (fewer than two years).
pub fn fit_trend(series: &FiscalSeries) -> Option<TrendFit> {
    let years = series.years_f64();
    let values = series.values();
    let line = linear_regression(&years, values).ok().flatten()?;
    let correlation = correlation(&years, values).ok().flatten();
    Some(TrendFit {
        line,
        correlation,
        first_year: *series.years().first()?,
        last_year: *series.years().last()?,
    })
}
