//! Two-year reconciliation of categorized budget data.
//!
//! Given the same domain's snapshot for two fiscal years, every category that
//! appears in either year gets a `ComparisonRecord`. A category missing from one
//! year counts as zero in that year, whether it was merely unfunded or did not
//! exist in that year's layout at all. Structural absence is reported through the
//! record's `defined_year*` flags, looked up in a `CategorySchema`, and never
//! changes the numbers.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::compare::schema::CategorySchema;
use crate::domain::{
    Amount, CategorySnapshot, ComparisonRecord, ComparisonSet, Domain, FiscalYearData, YearComparison,
};
use crate::error::AppError;

/// Summary-domain record labels.
pub const TOTAL_REVENUE: &str = "Total revenue";
pub const TOTAL_EXPENSE: &str = "Total expense";
pub const BALANCE: &str = "Balance";

/// Compare one domain's snapshots for two years.
///
/// Fails only when a total or difference leaves the decimal range.
pub fn compare_snapshots(
    domain: Domain,
    year1: &CategorySnapshot,
    year2: &CategorySnapshot,
    schema: &CategorySchema,
) -> Result<ComparisonSet, AppError> {
    let categories: BTreeSet<&String> = year1.amounts.keys().chain(year2.amounts.keys()).collect();

    let mut records = BTreeMap::new();
    for category in categories {
        let value1 = year1.get(category).unwrap_or(Decimal::ZERO);
        let value2 = year2.get(category).unwrap_or(Decimal::ZERO);
        let record = ComparisonRecord::new(category.as_str(), value1, value2)?.with_availability(
            schema.is_defined(category, year1.year),
            schema.is_defined(category, year2.year),
        );
        if record.is_schema_drift() {
            debug!(
                domain = domain.display_name(),
                category = %category,
                defined_year1 = record.defined_year1,
                defined_year2 = record.defined_year2,
                "category not defined in both years; compared as zero"
            );
        }
        records.insert(category.clone(), record);
    }

    let label = domain.total_label();
    let total = ComparisonRecord::new(
        label.as_str(),
        year1.total().ok_or_else(|| AppError::amount_overflow(&label))?,
        year2.total().ok_or_else(|| AppError::amount_overflow(&label))?,
    )?;

    debug!(
        domain = domain.display_name(),
        year1 = year1.year,
        year2 = year2.year,
        categories = records.len(),
        "compared snapshots"
    );

    Ok(ComparisonSet {
        domain,
        year1: year1.year,
        year2: year2.year,
        records,
        total,
    })
}

/// Compare every domain loaded for either year, plus the derived summary domain.
///
/// A domain loaded for only one year is compared against an empty snapshot.
pub fn compare_years(
    year1: &FiscalYearData,
    year2: &FiscalYearData,
    schema: &CategorySchema,
) -> Result<YearComparison, AppError> {
    let mut sets = BTreeMap::new();

    let domains: BTreeSet<Domain> = year1
        .domains
        .keys()
        .chain(year2.domains.keys())
        .copied()
        .filter(|d| *d != Domain::Summary)
        .collect();

    for domain in domains {
        let empty1 = CategorySnapshot::new(year1.year);
        let empty2 = CategorySnapshot::new(year2.year);
        let s1 = year1.snapshot(domain).unwrap_or(&empty1);
        let s2 = year2.snapshot(domain).unwrap_or(&empty2);
        sets.insert(domain, compare_snapshots(domain, s1, s2, schema)?);
    }

    sets.insert(Domain::Summary, summary_set(year1, year2)?);

    Ok(YearComparison {
        year1: year1.year,
        year2: year2.year,
        sets,
    })
}

/// Total revenue and total expense as records; the balance is the set's total row.
fn summary_set(year1: &FiscalYearData, year2: &FiscalYearData) -> Result<ComparisonSet, AppError> {
    let overflow = |label: &str| AppError::amount_overflow(label);
    let rows: [(&str, Option<Amount>, Option<Amount>); 2] = [
        (TOTAL_REVENUE, year1.total(Domain::Revenue), year2.total(Domain::Revenue)),
        (TOTAL_EXPENSE, year1.total(Domain::Expense), year2.total(Domain::Expense)),
    ];

    let mut records = BTreeMap::new();
    for (label, v1, v2) in rows {
        let record = ComparisonRecord::new(
            label,
            v1.ok_or_else(|| overflow(label))?,
            v2.ok_or_else(|| overflow(label))?,
        )?;
        records.insert(label.to_string(), record);
    }

    let total = ComparisonRecord::new(
        BALANCE,
        year1.balance().ok_or_else(|| overflow(BALANCE))?,
        year2.balance().ok_or_else(|| overflow(BALANCE))?,
    )?;

    Ok(ComparisonSet {
        domain: Domain::Summary,
        year1: year1.year,
        year2: year2.year,
        records,
        total,
    })
}

/// Largest increases and decreases (top-N each side).
#[derive(Debug, Clone)]
pub struct ChangeRanking {
    pub increases: Vec<ComparisonRecord>,
    pub decreases: Vec<ComparisonRecord>,
}

/// Rank a set's records by `difference`; unchanged categories appear in neither list.
pub fn rank_changes(set: &ComparisonSet, top_n: usize) -> ChangeRanking {
    let mut increases: Vec<ComparisonRecord> = set
        .records
        .values()
        .filter(|r| r.difference > Decimal::ZERO)
        .cloned()
        .collect();
    increases.sort_by(|a, b| b.difference.cmp(&a.difference).then_with(|| a.category.cmp(&b.category)));
    increases.truncate(top_n);

    let mut decreases: Vec<ComparisonRecord> = set
        .records
        .values()
        .filter(|r| r.difference < Decimal::ZERO)
        .cloned()
        .collect();
    decreases.sort_by(|a, b| a.difference.cmp(&b.difference).then_with(|| a.category.cmp(&b.category)));
    decreases.truncate(top_n);

    ChangeRanking { increases, decreases }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::schema::Availability;
    use crate::domain::PercentChange;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn snapshot(year: i32, rows: &[(&str, &str)]) -> CategorySnapshot {
        let mut s = CategorySnapshot::new(year);
        for (category, amount) in rows {
            s.add(*category, dec(amount)).unwrap();
        }
        s
    }

    #[test]
    fn category_only_in_second_year_is_new() {
        let y1 = snapshot(2022, &[("Health", "100")]);
        let y2 = snapshot(2023, &[("Health", "100"), ("Digital", "500")]);
        let set = compare_snapshots(Domain::Ministry, &y1, &y2, &CategorySchema::new()).unwrap();

        let r = &set.records["Digital"];
        assert_eq!(r.value_year1, Decimal::ZERO);
        assert_eq!(r.value_year2, dec("500"));
        assert_eq!(r.difference, dec("500"));
        assert_eq!(r.percent_change, PercentChange::New);
        assert_eq!(r.percent_change.as_percent(), None);
    }

    #[test]
    fn category_dropping_to_zero_is_minus_hundred_percent() {
        let y1 = snapshot(2022, &[("Subsidies", "100")]);
        let y2 = snapshot(2023, &[("Subsidies", "0")]);
        let set = compare_snapshots(Domain::Expense, &y1, &y2, &CategorySchema::new()).unwrap();

        let r = &set.records["Subsidies"];
        assert_eq!(r.difference, dec("-100"));
        assert_eq!(r.percent_change, PercentChange::Percent(dec("-100")));
    }

    #[test]
    fn missing_category_is_compared_as_zero() {
        let y1 = snapshot(2022, &[("Old Levy", "40"), ("VAT", "60")]);
        let y2 = snapshot(2023, &[("VAT", "90")]);
        let set = compare_snapshots(Domain::Revenue, &y1, &y2, &CategorySchema::new()).unwrap();

        assert_eq!(set.records.len(), 2);
        let r = &set.records["Old Levy"];
        assert_eq!(r.value_year2, Decimal::ZERO);
        assert_eq!(r.percent_change, PercentChange::Percent(dec("-100")));

        assert_eq!(set.total.category, "Total revenue");
        assert_eq!(set.total.value_year1, dec("100"));
        assert_eq!(set.total.value_year2, dec("90"));
        assert_eq!(set.total.percent_change, PercentChange::Percent(dec("-10")));
    }

    #[test]
    fn schema_flags_do_not_change_values() {
        let schema = CategorySchema::new().with("Digital", Availability::new(Some(2023), None).unwrap());
        let y1 = snapshot(2022, &[]);
        let y2 = snapshot(2023, &[("Digital", "500")]);
        let set = compare_snapshots(Domain::Ministry, &y1, &y2, &schema).unwrap();

        let r = &set.records["Digital"];
        assert!(!r.defined_year1);
        assert!(r.defined_year2);
        assert!(r.is_schema_drift());
        assert_eq!(r.value_year1, Decimal::ZERO);
        assert_eq!(r.difference, dec("500"));
    }

    #[test]
    fn compare_years_builds_summary() {
        let mut a = FiscalYearData::new(2022);
        a.snapshot_mut(Domain::Revenue).add("VAT", dec("1000")).unwrap();
        a.snapshot_mut(Domain::Expense).add("Wages", dec("800")).unwrap();
        let mut b = FiscalYearData::new(2023);
        b.snapshot_mut(Domain::Revenue).add("VAT", dec("900")).unwrap();
        b.snapshot_mut(Domain::Expense).add("Wages", dec("1000")).unwrap();
        b.snapshot_mut(Domain::Ministry).add("Health", dec("50")).unwrap();

        let cmp = compare_years(&a, &b, &CategorySchema::new()).unwrap();
        assert_eq!(cmp.sets.len(), 4);

        let ministry = cmp.set(Domain::Ministry).unwrap();
        assert_eq!(ministry.records["Health"].percent_change, PercentChange::New);

        let summary = cmp.set(Domain::Summary).unwrap();
        assert_eq!(summary.records.len(), 2);
        assert!(!summary.records.contains_key(BALANCE));
        let balance = &summary.total;
        assert_eq!(balance.category, BALANCE);
        assert_eq!(balance.value_year1, dec("200"));
        assert_eq!(balance.value_year2, dec("-100"));
        assert_eq!(balance.difference, dec("-300"));
        assert_eq!(balance.percent_change, PercentChange::Percent(dec("-150")));
        assert_eq!(summary.records[TOTAL_EXPENSE].percent_change, PercentChange::Percent(dec("25")));
    }

    #[test]
    fn huge_ratio_is_undefined_not_a_crash() {
        let y1 = snapshot(2022, &[("Tiny", "1")]);
        let y2 = snapshot(2023, &[("Tiny", "10000000000000000000000000000")]);
        let set = compare_snapshots(Domain::Expense, &y1, &y2, &CategorySchema::new()).unwrap();
        assert_eq!(set.records["Tiny"].percent_change, PercentChange::Undefined);
        assert_eq!(set.total.percent_change, PercentChange::Undefined);
    }

    #[test]
    fn out_of_range_difference_is_an_error() {
        let y1 = snapshot(2022, &[("Debt", "-70000000000000000000000000000")]);
        let y2 = snapshot(2023, &[("Debt", "70000000000000000000000000000")]);
        assert!(compare_snapshots(Domain::Expense, &y1, &y2, &CategorySchema::new()).is_err());

        let mut a = FiscalYearData::new(2022);
        a.snapshot_mut(Domain::Revenue).add("VAT", dec("70000000000000000000000000000")).unwrap();
        a.snapshot_mut(Domain::Expense).add("Wages", dec("-70000000000000000000000000000")).unwrap();
        let b = FiscalYearData::new(2023);
        assert!(compare_years(&a, &b, &CategorySchema::new()).is_err());
    }

    #[test]
    fn rank_changes_splits_and_orders() {
        let y1 = snapshot(2022, &[("A", "10"), ("B", "10"), ("C", "10"), ("D", "10")]);
        let y2 = snapshot(2023, &[("A", "50"), ("B", "20"), ("C", "5"), ("D", "10")]);
        let set = compare_snapshots(Domain::Expense, &y1, &y2, &CategorySchema::new()).unwrap();

        let ranking = rank_changes(&set, 1);
        assert_eq!(ranking.increases.len(), 1);
        assert_eq!(ranking.increases[0].category, "A");
        assert_eq!(ranking.decreases.len(), 1);
        assert_eq!(ranking.decreases[0].category, "C");

        let all = rank_changes(&set, 10);
        assert_eq!(all.increases.len(), 2);
        assert_eq!(all.decreases.len(), 1);
    }
}
