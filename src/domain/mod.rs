//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - fiscal inputs (`FiscalSeries`, `CategorySnapshot`, `FiscalYearData`)
//! - the budget breakdowns being compared (`Domain`)
//! - comparison outputs (`ComparisonRecord`, `ComparisonSet`, `YearComparison`)

pub mod types;

pub use types::*;
