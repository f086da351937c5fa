//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested pipeline
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{BalanceArgs, Cli, Command, CompareArgs, SeriesArgs, TrendArgs};
use crate::error::{AppError, EXIT_INTERNAL};

pub mod pipeline;

/// Entry point for the `budget` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` first: clap reads BUDGET_* defaults from the environment.
    crate::config::load_env();
    let cli = Cli::parse();
    crate::config::init_logging(cli.verbose);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Trend(args) => handle_trend(args),
        Command::Compare(args) => handle_compare(args),
        Command::Balance(args) => handle_balance(args),
    }
}

fn handle_summary(args: SeriesArgs) -> Result<(), AppError> {
    let run = pipeline::run_series(&args.input, args.metric.as_deref())?;

    if args.json {
        println!("{}", to_json(&run.summary)?);
        return Ok(());
    }

    println!(
        "{}",
        crate::report::format_series_report(&run.series, args.window)
    );
    Ok(())
}

fn handle_trend(args: TrendArgs) -> Result<(), AppError> {
    let run = pipeline::run_series(&args.series.input, args.series.metric.as_deref())?;

    if args.series.json {
        println!("{}", to_json(&run.trend)?);
        return Ok(());
    }

    println!(
        "{}",
        crate::report::trend_narrative(&run.series.label, run.trend.as_ref())
    );

    if let Some(trend) = &run.trend {
        println!(
            "slope={:.4} intercept={:.4}",
            trend.line.slope, trend.line.intercept
        );
        if let Some(year) = args.project {
            println!(
                "Projected {} for {year}: {}",
                run.series.label,
                crate::report::format_number(trend.project(year))
            );
        }
    }
    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let run = pipeline::run_compare(
        &args.input,
        args.schema.as_deref(),
        args.year1,
        args.year2,
        args.domain,
    )?;

    if run.rows_rejected > 0 {
        eprintln!("note: {} input row(s) skipped (run with -v for details)", run.rows_rejected);
    }

    println!(
        "{}",
        crate::report::format_year_comparison(&run.comparison, args.top)
    );

    if let Some(path) = &args.export {
        let sets: Vec<_> = run.comparison.sets.values().collect();
        crate::io::export::export_comparison_csv(path, &sets)?;
        info!(path = %path.display(), "wrote comparison CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::export::export_comparison_json(path, &run.comparison)?;
        info!(path = %path.display(), "wrote comparison JSON");
    }

    Ok(())
}

fn handle_balance(args: BalanceArgs) -> Result<(), AppError> {
    let (year, balance) = pipeline::run_balance(&args.input, args.year)?;
    println!("Fiscal year {year}");
    print!("{}", crate::report::describe_balance(balance));
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(EXIT_INTERNAL, format!("Failed to serialize JSON: {e}")))
}
