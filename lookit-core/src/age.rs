use serde::{Deserialize, Serialize};

use crate::forms::ValidationError;

pub const AGE_RANGE_ERROR: &str = "The maximum age must be greater than the minimum age.";

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// An age kept as independent year, month and day components.
///
/// The components are never normalized, `0 years 14 months` is stored as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeAge {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CompositeAge {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Approximate age in years, using fixed 12 month and 365 day years.
    pub fn total_years(&self) -> f64 {
        self.years as f64 + self.months as f64 / MONTHS_PER_YEAR + self.days as f64 / DAYS_PER_YEAR
    }
}

/// Eligible participant ages for a study.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: CompositeAge,
    pub max: CompositeAge,
}

impl AgeRange {
    pub fn new(min: CompositeAge, max: CompositeAge) -> Self {
        Self { min, max }
    }

    /// Rejects ranges whose minimum is strictly older than the maximum. Equal
    /// bounds are accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min.total_years() > self.max.total_years() {
            Err(ValidationError::new(AGE_RANGE_ERROR))
        } else {
            Ok(())
        }
    }
}
