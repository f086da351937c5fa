//! Terminal formatting: numbers, percentages and comparison tables.
//!
//! All text output goes through here so the engine modules stay free of
//! presentation concerns. Percentages round half-to-even at 2 decimals; amounts
//! carry thousands separators.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::compare::engine::rank_changes;
use crate::domain::{Amount, ComparisonRecord, ComparisonSet, PercentChange, YearComparison};

/// Marker shown instead of a percentage when the base year was zero.
pub const NEW_MARKER: &str = "new";
/// Marker for a zero base followed by a negative value.
pub const UNDEFINED_MARKER: &str = "n/a";

const CATEGORY_WIDTH: usize = 28;

/// `12.35%`, `new` or `n/a`.
pub fn format_percent(change: &PercentChange) -> String {
    match change {
        PercentChange::Percent(p) => format!("{:.2}%", round_half_even(*p)),
        PercentChange::New => NEW_MARKER.to_string(),
        PercentChange::Undefined => UNDEFINED_MARKER.to_string(),
    }
}

/// Percentage from a float statistic, rounded the same way as [`format_percent`].
pub fn format_percent_f64(v: f64) -> String {
    match Decimal::from_f64(v) {
        Some(d) => format!("{:.2}%", round_half_even(d)),
        None => format!("{v:.2}%"),
    }
}

/// `-1,234,567.89`.
pub fn format_amount(v: Amount) -> String {
    group_thousands(&format!("{:.2}", round_half_even(v)))
}

/// Float statistic with 2 decimals and thousands separators.
pub fn format_number(v: f64) -> String {
    match Decimal::from_f64(v) {
        Some(d) => format_amount(d),
        None => format!("{v:.2}"),
    }
}

/// Same as [`format_amount`] with an explicit `+` for positive values.
pub fn format_signed_amount(v: Amount) -> String {
    if v > Decimal::ZERO {
        format!("+{}", format_amount(v))
    } else {
        format_amount(v)
    }
}

fn round_half_even(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Insert `,` every three digits of the integer part of a plain decimal string.
fn group_thousands(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Full comparison report across all domains.
pub fn format_year_comparison(cmp: &YearComparison, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== budget comparison {} -> {} ===\n", cmp.year1, cmp.year2));
    for set in cmp.sets.values() {
        out.push('\n');
        out.push_str(&format_comparison(set, top_n));
    }
    out
}

/// Table of one domain's records, its total row and the largest movers.
pub fn format_comparison(set: &ComparisonSet, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "[{}] {} -> {}\n",
        set.domain.display_name(),
        set.year1,
        set.year2
    ));
    out.push_str(&format_table(set.records.values(), set.year1, set.year2));
    out.push_str(&format_row(&set.total, false));
    out.push('\n');

    if set.records.values().any(ComparisonRecord::is_schema_drift) {
        out.push_str("  * category not defined in both years' layout; compared as zero\n");
    }

    let ranking = rank_changes(set, top_n);
    if !ranking.increases.is_empty() {
        out.push_str("Largest increases:\n");
        for r in &ranking.increases {
            out.push_str(&format_mover(r));
        }
    }
    if !ranking.decreases.is_empty() {
        out.push_str("Largest decreases:\n");
        for r in &ranking.decreases {
            out.push_str(&format_mover(r));
        }
    }

    out
}

fn format_table<'a>(
    rows: impl Iterator<Item = &'a ComparisonRecord>,
    year1: i32,
    year2: i32,
) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<w$} {:>16} {:>16} {:>16} {:>10}",
            "category",
            year1,
            year2,
            "difference",
            "change",
            w = CATEGORY_WIDTH
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<w$} {:-<16} {:-<16} {:-<16} {:-<10}",
            "",
            "",
            "",
            "",
            "",
            w = CATEGORY_WIDTH
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(&format_row(r, r.is_schema_drift()));
        out.push('\n');
    }
    out
}

fn format_row(r: &ComparisonRecord, drift: bool) -> String {
    let mut category = truncate(&r.category, CATEGORY_WIDTH - 1);
    if drift {
        category.push('*');
    }
    format!(
        "{:<w$} {:>16} {:>16} {:>16} {:>10}",
        category,
        format_amount(r.value_year1),
        format_amount(r.value_year2),
        format_signed_amount(r.difference),
        format_percent(&r.percent_change),
        w = CATEGORY_WIDTH
    )
    .trim_end()
    .to_string()
}

fn format_mover(r: &ComparisonRecord) -> String {
    format!(
        "  {:<w$} {:>16} ({})\n",
        truncate(&r.category, CATEGORY_WIDTH),
        format_signed_amount(r.difference),
        format_percent(&r.percent_change),
        w = CATEGORY_WIDTH
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
