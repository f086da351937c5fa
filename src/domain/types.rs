//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed to the engine by whatever loads budget data
//! - exported to JSON/CSV after a comparison
//! - rendered by the report module

use std::collections::BTreeMap;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, EXIT_INPUT};

/// Fiscal year identifier (e.g. `2023`).
pub type FiscalYear = i32;

/// Monetary amount. Exact decimal so category sums reconcile to the cent.
pub type Amount = Decimal;

/// Budget breakdown a snapshot belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Revenue,
    Expense,
    Ministry,
    Administration,
    /// Derived domain: grand totals and balance. Never loaded from input.
    Summary,
}

impl Domain {
    /// Domains that can appear in input data.
    pub const LOADABLE: [Domain; 4] = [
        Domain::Revenue,
        Domain::Expense,
        Domain::Ministry,
        Domain::Administration,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Domain::Revenue => "revenue",
            Domain::Expense => "expense",
            Domain::Ministry => "ministry",
            Domain::Administration => "administration",
            Domain::Summary => "summary",
        }
    }

    /// Label of the aggregate record emitted for this domain.
    pub fn total_label(self) -> String {
        format!("Total {}", self.display_name())
    }

    /// Case-insensitive parse used by the CSV ingest.
    pub fn parse(s: &str) -> Option<Domain> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" | "revenues" | "income" => Some(Domain::Revenue),
            "expense" | "expenses" | "expenditure" => Some(Domain::Expense),
            "ministry" | "ministries" => Some(Domain::Ministry),
            "administration" | "administrations" => Some(Domain::Administration),
            _ => None,
        }
    }
}

/// A fiscal metric sampled once per year.
///
/// `years[i]` is the year of `values[i]`; years are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiscalSeries {
    pub label: String,
    years: Vec<FiscalYear>,
    values: Vec<f64>,
}

impl FiscalSeries {
    pub fn new(
        label: impl Into<String>,
        years: Vec<FiscalYear>,
        values: Vec<f64>,
    ) -> Result<Self, AppError> {
        let label = label.into();
        if years.len() != values.len() {
            return Err(AppError::length_mismatch(&label, years.len(), values.len()));
        }
        if let Some(w) = years.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("{label}: years must be strictly increasing ({} then {}).", w[0], w[1]),
            ));
        }
        if let Some((year, v)) = years.iter().zip(&values).find(|(_, v)| !v.is_finite()) {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("{label}: non-finite value {v} for {year}."),
            ));
        }
        Ok(Self { label, years, values })
    }

    pub fn years(&self) -> &[FiscalYear] {
        &self.years
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Years as `f64`, for pairing with `values()` in regression.
    pub fn years_f64(&self) -> Vec<f64> {
        self.years.iter().map(|&y| f64::from(y)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One fiscal year's category breakdown for a single domain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub year: FiscalYear,
    pub amounts: BTreeMap<String, Amount>,
}

impl CategorySnapshot {
    pub fn new(year: FiscalYear) -> Self {
        Self {
            year,
            amounts: BTreeMap::new(),
        }
    }

    /// Add `amount` to `category` (repeated rows accumulate).
    ///
    /// Fails without modifying the snapshot when either the category sum or the
    /// snapshot total would leave the decimal range.
    pub fn add(&mut self, category: impl Into<String>, amount: Amount) -> Result<(), AppError> {
        let category = category.into();
        let sum = self
            .get(&category)
            .unwrap_or(Decimal::ZERO)
            .checked_add(amount)
            .ok_or_else(|| AppError::amount_overflow(&category))?;
        self.total()
            .and_then(|total| total.checked_add(amount))
            .ok_or_else(|| AppError::amount_overflow(&format!("Total for year {}", self.year)))?;
        self.amounts.insert(category, sum);
        Ok(())
    }

    pub fn get(&self, category: &str) -> Option<Amount> {
        self.amounts.get(category).copied()
    }

    /// Domain grand total; `None` if the sum leaves the decimal range.
    pub fn total(&self) -> Option<Amount> {
        self.amounts
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// Every domain snapshot loaded for one fiscal year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FiscalYearData {
    pub year: FiscalYear,
    pub domains: BTreeMap<Domain, CategorySnapshot>,
}

impl FiscalYearData {
    pub fn new(year: FiscalYear) -> Self {
        Self {
            year,
            domains: BTreeMap::new(),
        }
    }

    pub fn snapshot(&self, domain: Domain) -> Option<&CategorySnapshot> {
        self.domains.get(&domain)
    }

    pub fn snapshot_mut(&mut self, domain: Domain) -> &mut CategorySnapshot {
        let year = self.year;
        self.domains
            .entry(domain)
            .or_insert_with(|| CategorySnapshot::new(year))
    }

    /// Grand total of a domain; zero when the domain was not loaded.
    pub fn total(&self, domain: Domain) -> Option<Amount> {
        match self.snapshot(domain) {
            Some(snapshot) => snapshot.total(),
            None => Some(Decimal::ZERO),
        }
    }

    /// Revenue minus expense; `None` on decimal overflow.
    pub fn balance(&self) -> Option<Amount> {
        self.total(Domain::Revenue)?
            .checked_sub(self.total(Domain::Expense)?)
    }
}

/// Relative change between two years of one amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PercentChange {
    /// `difference / |base| × 100`, unrounded.
    Percent(Decimal),
    /// Base was zero and the new value is positive: a newly funded line.
    New,
    /// Base was zero and the new value is negative, or the ratio is too large
    /// to represent.
    Undefined,
}

impl PercentChange {
    pub fn between(base: Amount, new: Amount) -> Self {
        if base.is_zero() {
            return if new.is_zero() {
                PercentChange::Percent(Decimal::ZERO)
            } else if new.is_sign_positive() {
                PercentChange::New
            } else {
                PercentChange::Undefined
            };
        }
        new.checked_sub(base)
            .and_then(|diff| diff.checked_div(base.abs()))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(PercentChange::Undefined, PercentChange::Percent)
    }

    pub fn as_percent(&self) -> Option<Decimal> {
        match self {
            PercentChange::Percent(p) => Some(*p),
            PercentChange::New | PercentChange::Undefined => None,
        }
    }
}

/// One category compared across two fiscal years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub category: String,
    pub value_year1: Amount,
    pub value_year2: Amount,
    /// `value_year2 − value_year1`.
    pub difference: Amount,
    pub percent_change: PercentChange,
    /// Whether the category exists in year 1's schema. Values are zero-filled either way.
    pub defined_year1: bool,
    pub defined_year2: bool,
}

impl ComparisonRecord {
    /// Fails when `value_year2 − value_year1` leaves the decimal range.
    pub fn new(
        category: impl Into<String>,
        value_year1: Amount,
        value_year2: Amount,
    ) -> Result<Self, AppError> {
        let category = category.into();
        let difference = value_year2
            .checked_sub(value_year1)
            .ok_or_else(|| AppError::amount_overflow(&category))?;
        Ok(Self {
            category,
            value_year1,
            value_year2,
            difference,
            percent_change: PercentChange::between(value_year1, value_year2),
            defined_year1: true,
            defined_year2: true,
        })
    }

    pub fn with_availability(mut self, defined_year1: bool, defined_year2: bool) -> Self {
        self.defined_year1 = defined_year1;
        self.defined_year2 = defined_year2;
        self
    }

    /// True when the category is missing from one year's schema.
    pub fn is_schema_drift(&self) -> bool {
        self.defined_year1 != self.defined_year2
    }
}

/// All category comparisons for one domain plus its grand-total record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSet {
    pub domain: Domain,
    pub year1: FiscalYear,
    pub year2: FiscalYear,
    pub records: BTreeMap<String, ComparisonRecord>,
    pub total: ComparisonRecord,
}

/// Per-domain comparison sets for a pair of fiscal years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearComparison {
    pub year1: FiscalYear,
    pub year2: FiscalYear,
    pub sets: BTreeMap<Domain, ComparisonSet>,
}

impl YearComparison {
    pub fn set(&self, domain: Domain) -> Option<&ComparisonSet> {
        self.sets.get(&domain)
    }
}
