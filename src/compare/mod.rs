//! Year-over-year comparison of categorized budget snapshots.
//!
//! - per-domain reconciliation and summary totals (`engine`)
//! - category availability across years (`schema`)

pub mod engine;
pub mod schema;

pub use engine::*;
pub use schema::*;
