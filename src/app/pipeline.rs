//! Shared command pipelines.
//!
//! Each function does load -> compute and returns plain results; `app` decides
//! how to print them. Keeping the workflow here keeps `app` about presentation
//! and makes the pipelines testable without touching stdout.

use std::path::Path;

use tracing::{info, warn};

use crate::compare::engine::compare_years;
use crate::compare::schema::CategorySchema;
use crate::domain::{Amount, Domain, FiscalSeries, FiscalYear, YearComparison};
use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA};
use crate::io::ingest::{SnapshotData, load_schema, load_series, load_snapshots};
use crate::math::regression::{TrendFit, fit_trend};
use crate::report::SeriesSummary;

/// Outputs of `budget summary` / `budget trend`.
#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub series: FiscalSeries,
    pub summary: SeriesSummary,
    pub trend: Option<TrendFit>,
}

/// Outputs of `budget compare`.
#[derive(Debug, Clone)]
pub struct CompareRun {
    pub comparison: YearComparison,
    pub rows_rejected: usize,
}

pub fn run_series(input: &Path, metric: Option<&str>) -> Result<SeriesRun, AppError> {
    let series = load_series(input, metric)?;
    info!(metric = %series.label, years = series.len(), "loaded series");
    Ok(analyze_series(series))
}

pub fn analyze_series(series: FiscalSeries) -> SeriesRun {
    let summary = SeriesSummary::from_values(series.values());
    let trend = fit_trend(&series);
    if !summary.outliers.is_empty() {
        info!(metric = %series.label, outliers = summary.outliers.len(), "outliers detected");
    }
    SeriesRun {
        series,
        summary,
        trend,
    }
}

pub fn run_compare(
    input: &Path,
    schema_path: Option<&Path>,
    year1: FiscalYear,
    year2: FiscalYear,
    domain: Option<Domain>,
) -> Result<CompareRun, AppError> {
    let data = load_snapshots(input)?;
    log_row_errors(&data);

    let schema = match schema_path {
        Some(path) => load_schema(path)?,
        None => CategorySchema::new(),
    };

    let comparison = compare_loaded(&data, &schema, year1, year2, domain)?;
    Ok(CompareRun {
        comparison,
        rows_rejected: data.row_errors.len(),
    })
}

/// Compare two loaded years, optionally keeping a single domain.
pub fn compare_loaded(
    data: &SnapshotData,
    schema: &CategorySchema,
    year1: FiscalYear,
    year2: FiscalYear,
    domain: Option<Domain>,
) -> Result<YearComparison, AppError> {
    let a = data.year(year1)?;
    let b = data.year(year2)?;

    let mut comparison = compare_years(a, b, schema)?;
    info!(year1, year2, domains = comparison.sets.len(), "compared fiscal years");

    if let Some(domain) = domain {
        if !comparison.sets.contains_key(&domain) {
            return Err(AppError::new(
                EXIT_NO_DATA,
                format!("No {} data for {year1} or {year2}.", domain.display_name()),
            ));
        }
        comparison.sets.retain(|d, _| *d == domain);
    }
    Ok(comparison)
}

/// Balance of `year` (latest year when `None`) as `(year, revenue − expense)`.
pub fn run_balance(input: &Path, year: Option<FiscalYear>) -> Result<(FiscalYear, Amount), AppError> {
    let data = load_snapshots(input)?;
    log_row_errors(&data);
    balance_of(&data, year)
}

pub fn balance_of(data: &SnapshotData, year: Option<FiscalYear>) -> Result<(FiscalYear, Amount), AppError> {
    let year = match year {
        Some(y) => y,
        None => *data
            .years
            .keys()
            .next_back()
            .ok_or_else(|| AppError::new(EXIT_NO_DATA, "No fiscal years loaded."))?,
    };
    let fy = data.year(year)?;
    if fy.snapshot(Domain::Revenue).is_none() && fy.snapshot(Domain::Expense).is_none() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Fiscal year {year} has neither revenue nor expense rows."),
        ));
    }
    let balance = fy
        .balance()
        .ok_or_else(|| AppError::amount_overflow(&format!("Balance for {year}")))?;
    Ok((year, balance))
}

fn log_row_errors(data: &SnapshotData) {
    if !data.row_errors.is_empty() {
        warn!(
            rejected = data.row_errors.len(),
            read = data.rows_read,
            "some snapshot rows were skipped"
        );
    }
}
