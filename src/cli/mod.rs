//! Command-line parsing for the budget statistics tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics and comparison code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{TOP_N_ENV, WINDOW_ENV};
use crate::domain::{Domain, FiscalYear};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "budget", version, about = "Budget statistics and year-over-year comparison")]
pub struct Cli {
    /// Log at debug level regardless of BUDGET_LOG.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Descriptive statistics, growth and moving average for one yearly metric.
    Summary(SeriesArgs),
    /// Linear trend of one yearly metric, with optional projection.
    Trend(TrendArgs),
    /// Compare two fiscal years category by category.
    Compare(CompareArgs),
    /// Classify one fiscal year's balance (revenue minus expense).
    Balance(BalanceArgs),
}

/// Options shared by the series commands.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// CSV with a `year` column and one or more metric columns.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Metric column to analyze (defaults to the first non-year column).
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Moving-average window in years.
    #[arg(short, long, env = WINDOW_ENV, default_value_t = 3)]
    pub window: usize,

    /// Print the statistics as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Extrapolate the fitted line to this fiscal year.
    #[arg(long, value_name = "YEAR")]
    pub project: Option<FiscalYear>,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Long-format CSV: `year,domain,category,amount`.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Base fiscal year.
    #[arg(long)]
    pub year1: FiscalYear,

    /// Fiscal year compared against the base.
    #[arg(long)]
    pub year2: FiscalYear,

    /// Restrict output to one domain (all domains by default).
    #[arg(short, long, value_enum)]
    pub domain: Option<Domain>,

    /// Optional `category,introduced,retired` CSV describing layout changes.
    #[arg(long, value_name = "CSV")]
    pub schema: Option<PathBuf>,

    /// Show top-N increases and decreases per domain.
    #[arg(long, env = TOP_N_ENV, default_value_t = 10)]
    pub top: usize,

    /// Export the compared records to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full comparison to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BalanceArgs {
    /// Long-format CSV: `year,domain,category,amount`.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Fiscal year to classify (latest year in the file by default).
    #[arg(long)]
    pub year: Option<FiscalYear>,
}
