//! Export comparison results to CSV and JSON.
//!
//! The CSV is meant for spreadsheets; the JSON keeps the full structure
//! (including the `new`/`undefined` percent markers) for downstream tools.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ComparisonRecord, ComparisonSet, PercentChange, YearComparison};
use crate::error::{AppError, EXIT_INTERNAL};

const CSV_HEADER: [&str; 10] = [
    "domain",
    "category",
    "year1",
    "year2",
    "value_year1",
    "value_year2",
    "difference",
    "percent_change",
    "defined_year1",
    "defined_year2",
];

/// JSON envelope written by [`write_comparison_json`].
#[derive(Debug, Serialize)]
pub struct ComparisonExport<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub comparison: &'a YearComparison,
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INTERNAL,
            format!("Failed to create {what} '{}': {e}", path.display()),
        )
    })
}

/// Write every record of `sets` (category rows followed by the total row).
pub fn write_comparison_csv<W: Write>(writer: W, sets: &[&ComparisonSet]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let err = |e: csv::Error| AppError::new(EXIT_INTERNAL, format!("Failed to write export CSV: {e}"));

    wtr.write_record(CSV_HEADER).map_err(err)?;
    for set in sets {
        for r in set.records.values().chain(std::iter::once(&set.total)) {
            wtr.write_record(csv_row(set, r)).map_err(err)?;
        }
    }
    wtr.flush()
        .map_err(|e| AppError::new(EXIT_INTERNAL, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn csv_row(set: &ComparisonSet, r: &ComparisonRecord) -> [String; 10] {
    let percent = match r.percent_change {
        PercentChange::Percent(p) => p.round_dp(4).normalize().to_string(),
        PercentChange::New => "new".to_string(),
        PercentChange::Undefined => "undefined".to_string(),
    };
    [
        set.domain.display_name().to_string(),
        r.category.clone(),
        set.year1.to_string(),
        set.year2.to_string(),
        r.value_year1.to_string(),
        r.value_year2.to_string(),
        r.difference.to_string(),
        percent,
        r.defined_year1.to_string(),
        r.defined_year2.to_string(),
    ]
}

/// Write a comparison CSV file.
pub fn export_comparison_csv(path: &Path, sets: &[&ComparisonSet]) -> Result<(), AppError> {
    write_comparison_csv(create(path, "export CSV")?, sets)
}

/// Write a comparison as pretty JSON.
pub fn write_comparison_json<W: Write>(writer: W, comparison: &YearComparison) -> Result<(), AppError> {
    let export = ComparisonExport {
        tool: "budget",
        generated_at: Utc::now(),
        comparison,
    };
    serde_json::to_writer_pretty(writer, &export)
        .map_err(|e| AppError::new(EXIT_INTERNAL, format!("Failed to write comparison JSON: {e}")))
}

/// Write a comparison JSON file.
pub fn export_comparison_json(path: &Path, comparison: &YearComparison) -> Result<(), AppError> {
    write_comparison_json(create(path, "comparison JSON")?, comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::engine::compare_years;
    use crate::compare::schema::CategorySchema;
    use crate::domain::{Domain, FiscalYearData};

    fn sample() -> YearComparison {
        let mut a = FiscalYearData::new(2022);
        a.snapshot_mut(Domain::Revenue).add("Income, personal", "100".parse().unwrap()).unwrap();
        let mut b = FiscalYearData::new(2023);
        b.snapshot_mut(Domain::Revenue).add("Income, personal", "150".parse().unwrap()).unwrap();
        b.snapshot_mut(Domain::Revenue).add("Carbon levy", "40".parse().unwrap()).unwrap();
        compare_years(&a, &b, &CategorySchema::new()).unwrap()
    }

    #[test]
    fn csv_quotes_categories_and_marks_new() {
        let cmp = sample();
        let set = cmp.set(Domain::Revenue).unwrap();
        let mut buf = Vec::new();
        write_comparison_csv(&mut buf, &[set]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("revenue,Carbon levy,2022,2023,0,40,40,new,"));
        assert!(lines[2].contains("\"Income, personal\""));
        assert!(lines[2].ends_with(",100,150,50,50,true,true"), "{}", lines[2]);
        assert!(lines[3].starts_with("revenue,Total revenue,"));
    }

    #[test]
    fn summary_set_writes_balance_once() {
        let cmp = sample();
        let set = cmp.set(Domain::Summary).unwrap();
        let mut buf = Vec::new();
        write_comparison_csv(&mut buf, &[set]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("summary,Total expense,"));
        assert!(lines[2].starts_with("summary,Total revenue,"));
        assert!(lines[3].starts_with("summary,Balance,2022,2023,100,190,90,"));
        assert_eq!(lines.iter().filter(|l| l.contains(",Balance,")).count(), 1);
    }

    #[test]
    fn json_keeps_percent_markers() {
        let cmp = sample();
        let mut buf = Vec::new();
        write_comparison_json(&mut buf, &cmp).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["tool"], "budget");
        let record = &value["comparison"]["sets"]["revenue"]["records"]["Carbon levy"];
        assert_eq!(record["percent_change"]["kind"], "new");
        assert!(value["comparison"]["sets"]["summary"].is_object());
    }
}
