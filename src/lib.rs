//! `budget-stats` library crate.
//!
//! Statistical analysis and year-over-year comparison of fiscal budget data.
//! The binary (`budget`) is a thin wrapper around this library so that:
//!
//! - the statistics and comparison engine is testable without spawning processes
//! - the engine can be embedded by whatever loads and displays budget data
//! - `stats`, `math`, `compare` and `report` stay free of I/O

pub mod app;
pub mod cli;
pub mod compare;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod stats;
