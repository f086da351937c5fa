//! Process configuration: `.env` loading and log setup.
//!
//! Precedence for tunables is CLI flag > environment (`.env` included) > built-in
//! default. Clap reads the environment itself through `#[arg(env = ...)]`, so
//! `.env` must be loaded before parsing.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`tracing_subscriber` syntax).
pub const LOG_ENV: &str = "BUDGET_LOG";
/// Default `--top` for comparison rankings.
pub const TOP_N_ENV: &str = "BUDGET_TOP_N";
/// Default `--window` for moving averages.
pub const WINDOW_ENV: &str = "BUDGET_MOVING_WINDOW";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Load `.env` from the working directory (or a parent), if present.
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// Build the log filter from `BUDGET_LOG`, falling back to `warn`.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber. Logs go to stderr so reports on stdout stay clean.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        log_filter()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
