//! Category availability across fiscal years.
//!
//! Budget layouts drift: a ministry is created in 2019, a revenue line is folded
//! into another in 2022. `CategorySchema` records, per category, the span of
//! years it exists in so callers can ask "is this category defined for year Y"
//! without hard-coding year checks. Categories not registered are treated as
//! defined in every year.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::FiscalYear;
use crate::error::{AppError, EXIT_INPUT};

/// Inclusive span of years a category exists in. `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Availability {
    pub introduced: Option<FiscalYear>,
    pub retired: Option<FiscalYear>,
}

impl Availability {
    pub fn new(introduced: Option<FiscalYear>, retired: Option<FiscalYear>) -> Result<Self, AppError> {
        if let (Some(from), Some(to)) = (introduced, retired) {
            if to < from {
                return Err(AppError::new(
                    EXIT_INPUT,
                    format!("Category retired ({to}) before it was introduced ({from})."),
                ));
            }
        }
        Ok(Self { introduced, retired })
    }

    pub fn contains(&self, year: FiscalYear) -> bool {
        self.introduced.is_none_or(|from| year >= from) && self.retired.is_none_or(|to| year <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorySchema {
    categories: BTreeMap<String, Availability>,
}

impl CategorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, availability: Availability) {
        self.categories.insert(category.into(), availability);
    }

    /// Builder-style `insert`.
    pub fn with(mut self, category: impl Into<String>, availability: Availability) -> Self {
        self.insert(category, availability);
        self
    }

    pub fn availability(&self, category: &str) -> Option<Availability> {
        self.categories.get(category).copied()
    }

    pub fn is_defined(&self, category: &str, year: FiscalYear) -> bool {
        self.availability(category).is_none_or(|a| a.contains(year))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_categories_always_exist() {
        let schema = CategorySchema::new();
        assert!(schema.is_defined("Health", 1990));
    }

    #[test]
    fn spans_are_inclusive() {
        let schema = CategorySchema::new()
            .with("Digital Affairs", Availability::new(Some(2019), None).unwrap())
            .with("Old Levy", Availability::new(None, Some(2021)).unwrap());

        assert!(!schema.is_defined("Digital Affairs", 2018));
        assert!(schema.is_defined("Digital Affairs", 2019));
        assert!(schema.is_defined("Old Levy", 2021));
        assert!(!schema.is_defined("Old Levy", 2022));
    }

    #[test]
    fn reversed_span_is_rejected() {
        assert!(Availability::new(Some(2022), Some(2020)).is_err());
        assert!(Availability::new(Some(2020), Some(2020)).is_ok());
    }
}
