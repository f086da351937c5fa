//! Mathematical utilities: Pearson correlation and simple least squares.

pub mod regression;

pub use regression::*;
