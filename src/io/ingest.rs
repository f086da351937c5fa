//! CSV ingest and normalization.
//!
//! This module turns the files handed over by the data-access side into engine
//! inputs: fiscal series, per-year category snapshots and the category schema.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no statistics here

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

use crate::compare::schema::{Availability, CategorySchema};
use crate::domain::{Amount, Domain, FiscalSeries, FiscalYear, FiscalYearData};
use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed snapshot rows grouped by fiscal year, plus what was skipped.
#[derive(Debug, Clone)]
pub struct SnapshotData {
    pub years: BTreeMap<FiscalYear, FiscalYearData>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl SnapshotData {
    pub fn year(&self, year: FiscalYear) -> Result<&FiscalYearData, AppError> {
        self.years.get(&year).ok_or_else(|| {
            let available: Vec<String> = self.years.keys().map(ToString::to_string).collect();
            AppError::new(
                EXIT_NO_DATA,
                format!("No rows for fiscal year {year} (available: {}).", available.join(", ")),
            )
        })
    }
}

fn open(path: &Path, what: &str) -> Result<File, AppError> {
    File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open {what} '{}': {e}", path.display())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn display_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str, what: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::new(EXIT_INPUT, format!("Missing required column in {what}: `{name}`")))
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_year(s: &str) -> Result<FiscalYear, String> {
    // Fiscal years sometimes come as "2023/24"; the first year identifies it.
    let head = s.split(['/', '-']).next().unwrap_or(s).trim();
    head.parse::<FiscalYear>()
        .map_err(|_| format!("Invalid fiscal year `{s}`."))
}

/// Parse a money amount, tolerating `,` / `_` / space thousands separators.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| format!("Invalid amount `{s}`."))
}

/// Load a yearly series CSV from disk. See [`read_series`].
pub fn load_series(path: &Path, metric: Option<&str>) -> Result<FiscalSeries, AppError> {
    read_series(open(path, "series CSV")?, metric)
}

/// Read a `year,<metric>...` CSV into a `FiscalSeries`.
///
/// `metric` selects the value column (case-insensitive); by default the first
/// column other than `year` is used. Rows are sorted by year; duplicate years
/// are rejected because a series holds one value per year.
pub fn read_series<R: Read>(reader: R, metric: Option<&str>) -> Result<FiscalSeries, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read series CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let year_idx = require_column(&header_map, "year", "series CSV")?;

    let (metric_idx, label) = match metric {
        Some(name) => {
            let key = normalize_header_name(name);
            let idx = require_column(&header_map, &key, "series CSV")?;
            (idx, display_header_name(headers.get(idx).unwrap_or(name)))
        }
        None => headers
            .iter()
            .enumerate()
            .find(|(idx, _)| *idx != year_idx)
            .map(|(idx, name)| (idx, display_header_name(name)))
            .ok_or_else(|| AppError::new(EXIT_INPUT, "Series CSV has no value column besides `year`."))?,
    };

    let mut rows: BTreeMap<FiscalYear, f64> = BTreeMap::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Series CSV line {line}: parse error: {e}")))?;

        let year = field(&record, year_idx)
            .ok_or_else(|| "Missing `year` value.".to_string())
            .and_then(parse_year)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Series CSV line {line}: {e}")))?;

        // Blank cells mean "not reported"; the year is left out of the series.
        let Some(raw) = field(&record, metric_idx) else {
            warn!(line, year, column = %label, "blank value; year skipped");
            continue;
        };
        let value = parse_amount(raw)
            .and_then(|d| d.to_f64().ok_or_else(|| format!("Value `{raw}` out of range.")))
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Series CSV line {line}: {e}")))?;

        if rows.insert(year, value).is_some() {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("Series CSV line {line}: duplicate year {year}."),
            ));
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(EXIT_NO_DATA, "Series CSV contains no usable rows."));
    }

    let (years, values): (Vec<FiscalYear>, Vec<f64>) = rows.into_iter().unzip();
    FiscalSeries::new(label, years, values)
}

/// Load a snapshot CSV from disk. See [`read_snapshots`].
pub fn load_snapshots(path: &Path) -> Result<SnapshotData, AppError> {
    read_snapshots(open(path, "snapshot CSV")?)
}

/// Read long-format `year,domain,category,amount` rows.
///
/// Bad rows are skipped and reported in `row_errors`; repeated
/// `(year, domain, category)` rows are summed.
pub fn read_snapshots<R: Read>(reader: R) -> Result<SnapshotData, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read snapshot CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let year_idx = require_column(&header_map, "year", "snapshot CSV")?;
    let domain_idx = require_column(&header_map, "domain", "snapshot CSV")?;
    let category_idx = require_column(&header_map, "category", "snapshot CSV")?;
    let amount_idx = require_column(&header_map, "amount", "snapshot CSV")?;

    let mut years: BTreeMap<FiscalYear, FiscalYearData> = BTreeMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let stored = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_snapshot_row(&record, year_idx, domain_idx, category_idx, amount_idx))
            .and_then(|(year, domain, category, amount)| {
                years
                    .entry(year)
                    .or_insert_with(|| FiscalYearData::new(year))
                    .snapshot_mut(domain)
                    .add(category, amount)
                    .map_err(|e| e.to_string())
            });

        match stored {
            Ok(()) => rows_used += 1,
            Err(message) => {
                warn!(line, %message, "skipping snapshot row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if rows_used == 0 {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("No valid snapshot rows ({} read, {} rejected).", rows_read, row_errors.len()),
        ));
    }

    Ok(SnapshotData {
        years,
        row_errors,
        rows_read,
    })
}

fn parse_snapshot_row(
    record: &StringRecord,
    year_idx: usize,
    domain_idx: usize,
    category_idx: usize,
    amount_idx: usize,
) -> Result<(FiscalYear, Domain, String, Amount), String> {
    let year = parse_year(field(record, year_idx).ok_or("Missing `year` value.")?)?;
    let domain_raw = field(record, domain_idx).ok_or("Missing `domain` value.")?;
    let domain = Domain::parse(domain_raw).ok_or_else(|| format!("Unknown domain `{domain_raw}`."))?;
    let category = field(record, category_idx).ok_or("Missing `category` value.")?;
    // An empty amount cell means the category had no allocation that year.
    let amount = match field(record, amount_idx) {
        Some(raw) => parse_amount(raw)?,
        None => Decimal::ZERO,
    };
    Ok((year, domain, category.to_string(), amount))
}

/// Load a schema CSV from disk. See [`read_schema`].
pub fn load_schema(path: &Path) -> Result<CategorySchema, AppError> {
    read_schema(open(path, "schema CSV")?)
}

/// Read `category,introduced,retired` rows; blank years are open-ended.
///
/// Unlike snapshots, a malformed schema row is a hard error: a wrong span would
/// silently mislabel every comparison that touches the category.
pub fn read_schema<R: Read>(reader: R) -> Result<CategorySchema, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read schema CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let category_idx = require_column(&header_map, "category", "schema CSV")?;
    let introduced_idx = header_map.get("introduced").copied();
    let retired_idx = header_map.get("retired").copied();

    let mut schema = CategorySchema::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Schema CSV line {line}: parse error: {e}")))?;
        let Some(category) = field(&record, category_idx) else {
            return Err(AppError::new(EXIT_INPUT, format!("Schema CSV line {line}: missing category.")));
        };

        let year_at = |col: Option<usize>| -> Result<Option<FiscalYear>, AppError> {
            col.and_then(|i| field(&record, i))
                .map(parse_year)
                .transpose()
                .map_err(|e| AppError::new(EXIT_INPUT, format!("Schema CSV line {line}: {e}")))
        };
        let availability = Availability::new(year_at(introduced_idx)?, year_at(retired_idx)?)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Schema CSV line {line}: {e}")))?;
        schema.insert(category, availability);
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn amounts_accept_separators() {
        assert_eq!(parse_amount("1,234,567.50"), Ok(dec("1234567.50")));
        assert_eq!(parse_amount("-2_000"), Ok(dec("-2000")));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn fiscal_year_ranges_use_first_year() {
        assert_eq!(parse_year("2023/24"), Ok(2023));
        assert_eq!(parse_year("2023"), Ok(2023));
        assert!(parse_year("FY").is_err());
    }

    #[test]
    fn series_picks_metric_column_and_sorts_years() {
        let csv = "\u{feff}Year,Revenue,Expense\n2022,120,100\n2020,100,90\n2021,110,\n";
        let s = read_series(csv.as_bytes(), Some("expense")).unwrap();
        assert_eq!(s.label, "Expense");
        assert_eq!(s.years(), &[2020, 2022]);
        assert_eq!(s.values(), &[90.0, 100.0]);

        let s = read_series(csv.as_bytes(), None).unwrap();
        assert_eq!(s.label, "Revenue");
        assert_eq!(s.years(), &[2020, 2021, 2022]);
    }

    #[test]
    fn series_rejects_duplicate_years_and_missing_columns() {
        assert!(read_series("year,v\n2020,1\n2020,2\n".as_bytes(), None).is_err());
        let err = read_series("yr,v\n2020,1\n".as_bytes(), None).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(read_series("year,v\n2020,1\n".as_bytes(), Some("other")).is_err());
    }

    #[test]
    fn snapshots_group_by_year_and_collect_row_errors() {
        let csv = "year,domain,category,amount\n\
                   2022,revenue,VAT,\"1,000\"\n\
                   2022,revenue,VAT,500\n\
                   2022,expense,Wages,900\n\
                   2023,Revenue,VAT,1600\n\
                   2023,galaxy,Stars,1\n\
                   2023,expense,,10\n\
                   2023,expense,Wages,abc\n";
        let data = read_snapshots(csv.as_bytes()).unwrap();

        assert_eq!(data.rows_read, 7);
        assert_eq!(data.row_errors.len(), 3);
        assert_eq!(data.row_errors[0].line, 6);

        let y2022 = data.year(2022).unwrap();
        assert_eq!(y2022.total(Domain::Revenue), Some(dec("1500")));
        assert_eq!(y2022.balance(), Some(dec("600")));
        assert_eq!(data.year(2023).unwrap().total(Domain::Revenue), Some(dec("1600")));
        assert_eq!(data.year(2030).unwrap_err().exit_code(), EXIT_NO_DATA);
    }

    #[test]
    fn overflowing_rows_are_skipped() {
        let csv = "year,domain,category,amount\n\
                   2022,revenue,A,70000000000000000000000000000\n\
                   2022,revenue,A,70000000000000000000000000000\n\
                   2022,revenue,B,70000000000000000000000000000\n\
                   2022,revenue,C,5\n";
        let data = read_snapshots(csv.as_bytes()).unwrap();

        assert_eq!(data.rows_read, 4);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 3);
        assert_eq!(data.row_errors[1].line, 4);
        assert!(data.row_errors[0].message.contains("decimal range"));

        let revenue = data.year(2022).unwrap().snapshot(Domain::Revenue).unwrap();
        assert_eq!(revenue.get("A"), Some(dec("70000000000000000000000000000")));
        assert_eq!(revenue.get("B"), None);
        assert_eq!(revenue.get("C"), Some(dec("5")));
    }

    #[test]
    fn snapshots_with_no_valid_rows_fail() {
        let err = read_snapshots("year,domain,category,amount\nx,y,z,w\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_DATA);
    }

    #[test]
    fn schema_rows_become_spans() {
        let csv = "category,introduced,retired\nDigital,2019,\nOld Levy,,2021\n";
        let schema = read_schema(csv.as_bytes()).unwrap();
        assert_eq!(schema.len(), 2);
        assert!(!schema.is_defined("Digital", 2018));
        assert!(schema.is_defined("Old Levy", 2000));
        assert!(!schema.is_defined("Old Levy", 2022));

        assert!(read_schema("category,introduced,retired\nX,2022,2020\n".as_bytes()).is_err());
    }
}
