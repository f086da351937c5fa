//! Reporting: balance classification, series summaries and trend narratives.
//!
//! Anything undefined for the given input is left out of the rendered text;
//! a placeholder zero would read as a real result.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Amount, FiscalSeries};
use crate::math::regression::{TrendFit, fit_trend};
use crate::stats::descriptive::{
    Quartiles, coefficient_of_variation, growth_rates, mean, median, mode, moving_average, quartiles,
    range, std_dev, variance,
};
use crate::stats::outliers::identify_outliers;

pub mod format;

pub use format::*;

/// Sign of a budget balance (revenue minus expense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceClass {
    Surplus,
    Balanced,
    Deficit,
}

impl BalanceClass {
    pub fn label(self) -> &'static str {
        match self {
            BalanceClass::Surplus => "surplus",
            BalanceClass::Balanced => "balanced",
            BalanceClass::Deficit => "deficit",
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            BalanceClass::Surplus => {
                "Revenue exceeds expenditure. The surplus can reduce outstanding debt or be set aside as reserves."
            }
            BalanceClass::Balanced => "Revenue exactly covers expenditure. The budget is balanced.",
            BalanceClass::Deficit => {
                "Expenditure exceeds revenue. The shortfall has to be financed through borrowing or reserves."
            }
        }
    }
}

pub fn classify_balance(balance: Amount) -> BalanceClass {
    if balance > Decimal::ZERO {
        BalanceClass::Surplus
    } else if balance < Decimal::ZERO {
        BalanceClass::Deficit
    } else {
        BalanceClass::Balanced
    }
}

/// `Balance: -1,250.00 (deficit)` followed by the class narrative.
pub fn describe_balance(balance: Amount) -> String {
    let class = classify_balance(balance);
    format!(
        "Balance: {} ({})\n{}\n",
        format_amount(balance),
        class.label(),
        class.narrative()
    )
}

/// Every descriptive statistic of a series, `None` where undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub variance: Option<f64>,
    pub range: Option<f64>,
    pub mode: Option<f64>,
    pub quartiles: Option<Quartiles>,
    pub coefficient_of_variation: Option<f64>,
    pub outliers: Vec<f64>,
}

impl SeriesSummary {
    pub fn from_values(series: &[f64]) -> Self {
        Self {
            count: series.len(),
            mean: mean(series),
            median: median(series),
            std_dev: std_dev(series),
            variance: variance(series),
            range: range(series),
            mode: mode(series),
            quartiles: quartiles(series),
            coefficient_of_variation: coefficient_of_variation(series),
            outliers: identify_outliers(series),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Count: {}\n", self.count));
        push_stat(&mut out, "Mean", self.mean);
        push_stat(&mut out, "Median", self.median);
        push_stat(&mut out, "Std dev", self.std_dev);
        push_stat(&mut out, "Variance", self.variance);
        push_stat(&mut out, "Range", self.range);
        if self.count > 0 {
            match self.mode {
                Some(m) => out.push_str(&format!("Mode: {}\n", format_number(m))),
                None => out.push_str("Mode: no mode\n"),
            }
        }
        if let Some(q) = self.quartiles {
            out.push_str(&format!(
                "Quartiles: Q1={} Q2={} Q3={}\n",
                format_number(q.q1),
                format_number(q.q2),
                format_number(q.q3)
            ));
            out.push_str(&format!("IQR: {}\n", format_number(q.iqr())));
        }
        if let Some(cv) = self.coefficient_of_variation {
            out.push_str(&format!("Coefficient of variation: {}\n", format_percent_f64(cv)));
        }
        out.push_str(&format!("Outliers: {}\n", self.outliers.len()));
        out
    }
}

fn push_stat(out: &mut String, name: &str, value: Option<f64>) {
    if let Some(v) = value {
        out.push_str(&format!("{name}: {}\n", format_number(v)));
    }
}

/// Render the descriptive statistics of `series` as text.
pub fn summarize(series: &[f64]) -> String {
    SeriesSummary::from_values(series).render()
}

/// Qualitative strength of a correlation coefficient.
pub fn correlation_strength(r: f64) -> &'static str {
    let a = r.abs();
    if a >= 0.7 {
        "strong"
    } else if a >= 0.4 {
        "moderate"
    } else if a >= 0.1 {
        "weak"
    } else {
        "negligible"
    }
}

/// One-sentence description of a linear trend.
pub fn trend_narrative(label: &str, trend: Option<&TrendFit>) -> String {
    let Some(t) = trend else {
        return format!("{label}: not enough data to establish a trend.");
    };

    let slope = t.average_annual_change();
    let movement = if slope > 0.0 {
        format!("increased by {} per year on average", format_number(slope))
    } else if slope < 0.0 {
        format!("decreased by {} per year on average", format_number(slope.abs()))
    } else {
        "remained flat".to_string()
    };

    let fit = match t.correlation {
        Some(r) => {
            let direction = if r >= 0.0 { "positive" } else { "negative" };
            format!(
                " ({} {direction} correlation with time, r = {r:.3})",
                correlation_strength(r)
            )
        }
        None => String::new(),
    };

    format!(
        "{label} {movement} between {} and {}{fit}.",
        t.first_year, t.last_year
    )
}

/// Full text report for one fiscal series: statistics, growth, moving average, trend.
pub fn format_series_report(series: &FiscalSeries, window: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", series.label));
    out.push_str(&summarize(series.values()));

    let growth = growth_rates(series.values());
    if !growth.is_empty() {
        out.push_str("\nYear-over-year change:\n");
        for (year, g) in series.years().iter().skip(1).zip(&growth) {
            let text = match g {
                Some(p) => format_percent_f64(*p),
                None => NEW_MARKER.to_string(),
            };
            out.push_str(&format!("  {year}: {text}\n"));
        }
    }

    if let Some(ma) = moving_average(series.values(), window) {
        out.push_str(&format!("\nMoving average ({window}-year):\n"));
        // Each window is labelled with its last year.
        for (year, v) in series.years().iter().skip(window - 1).zip(&ma) {
            out.push_str(&format!("  {year}: {}\n", format_number(*v)));
        }
    }

    out.push('\n');
    out.push_str(&trend_narrative(&series.label, fit_trend(series).as_ref()));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_balance_by_sign() {
        assert_eq!(classify_balance(Decimal::ZERO), BalanceClass::Balanced);
        assert_eq!(classify_balance(Decimal::NEGATIVE_ONE), BalanceClass::Deficit);
        assert_eq!(classify_balance(Decimal::ONE), BalanceClass::Surplus);
        assert_eq!(classify_balance(Decimal::ZERO).label(), "balanced");
        assert_eq!(classify_balance(Decimal::NEGATIVE_ONE).label(), "deficit");
        assert_eq!(classify_balance(Decimal::ONE).label(), "surplus");
    }

    #[test]
    fn describe_balance_includes_narrative() {
        let text = describe_balance("-1250".parse().unwrap());
        assert!(text.starts_with("Balance: -1,250.00 (deficit)"));
        assert!(text.contains("borrowing"));
    }

    #[test]
    fn summarize_full_series() {
        let text = summarize(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 100.0]);
        assert!(text.contains("Count: 9"));
        assert!(text.contains("Median: 3.00"));
        assert!(text.contains("Mode: 3.00"));
        assert!(text.contains("Quartiles: Q1=2.00 Q2=3.00 Q3=4.00"));
        assert!(text.contains("IQR: 2.00"));
        assert!(text.contains("Coefficient of variation:"));
        assert!(text.contains("Outliers: 1"));
    }

    #[test]
    fn summarize_omits_undefined_statistics() {
        let text = summarize(&[5.0, 7.0]);
        assert!(text.contains("Mean: 6.00"));
        assert!(text.contains("Mode: no mode"));
        assert!(!text.contains("Quartiles"));
        assert!(!text.contains("IQR"));

        let single = summarize(&[5.0]);
        assert!(!single.contains("Std dev"));
        assert!(!single.contains("Variance"));
        assert!(single.contains("Mode: 5.00"));

        let empty = summarize(&[]);
        assert!(empty.contains("Count: 0"));
        assert!(!empty.contains("Mean"));
        assert!(!empty.contains("Mode"));
    }

    #[test]
    fn summarize_skips_cv_for_zero_mean() {
        let text = summarize(&[-2.0, 0.0, 2.0]);
        assert!(!text.contains("Coefficient of variation"));
        assert!(text.contains("Std dev: 2.00"));
    }

    #[test]
    fn summarize_never_prints_nan() {
        let text = summarize(&[f64::MAX, f64::MAX, 1.0]);
        assert!(!text.contains("Coefficient of variation"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn trend_narrative_describes_direction() {
        let series =
            FiscalSeries::new("Total revenue", vec![2020, 2021, 2022], vec![300.0, 200.0, 100.0])
                .unwrap();
        let trend = fit_trend(&series);
        let text = trend_narrative(&series.label, trend.as_ref());
        assert!(text.contains("decreased by 100.00 per year"), "{text}");
        assert!(text.contains("strong negative correlation"), "{text}");
        assert!(text.contains("between 2020 and 2022"));

        assert_eq!(
            trend_narrative("Debt", None),
            "Debt: not enough data to establish a trend."
        );
    }

    #[test]
    fn series_report_sections() {
        let series = FiscalSeries::new(
            "Total expense",
            vec![2019, 2020, 2021, 2022],
            vec![0.0, 100.0, 110.0, 121.0],
        )
        .unwrap();
        let text = format_series_report(&series, 2);
        assert!(text.contains("=== Total expense ==="));
        assert!(text.contains("2020: new"));
        assert!(text.contains("2021: 10.00%"));
        assert!(text.contains("Moving average (2-year):"));
        assert!(text.contains("2020: 50.00"));
        assert!(text.contains("increased by"));
    }
}
