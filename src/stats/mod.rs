//! Descriptive statistics and outlier detection over fiscal series.

pub mod descriptive;
pub mod outliers;

pub use descriptive::*;
pub use outliers::*;
