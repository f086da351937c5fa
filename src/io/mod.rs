//! Input/output helpers.
//!
//! - CSV ingest + validation for series, snapshots and schema (`ingest`)
//! - comparison exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
