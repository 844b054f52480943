//! Accepted preparation-window bounds.

use serde::{Deserialize, Serialize};

use prepwise_core::error::PlannerError;

pub const DEFAULT_MIN_DAYS: u32 = 7;
pub const DEFAULT_MAX_DAYS: u32 = 120;

/// Inclusive bounds on the number of preparation days a caller may request.
///
/// [`crate::allocate`] accepts any day count; this check runs at the
/// boundary (HTTP handlers, CLI) before a request reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: u32,
    pub max: u32,
}

impl Default for DayRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_DAYS,
            max: DEFAULT_MAX_DAYS,
        }
    }
}

impl DayRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, days: i64) -> bool {
        days >= i64::from(self.min) && days <= i64::from(self.max)
    }

    /// Accept `days` if it lies inside the range.
    pub fn check(&self, days: impl Into<i64>) -> Result<u32, PlannerError> {
        let days = days.into();
        if self.contains(days) {
            // in range, so it fits in u32
            Ok(days as u32)
        } else {
            Err(PlannerError::DaysOutOfRange {
                days,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_inclusive() {
        let range = DayRange::default();
        assert_eq!(range.check(7), Ok(7));
        assert_eq!(range.check(120), Ok(120));
        assert!(range.check(6).is_err());
        assert!(range.check(121).is_err());
    }

    #[test]
    fn negative_days_rejected_with_bounds() {
        let err = DayRange::new(10, 20).check(-3i64).unwrap_err();
        assert_eq!(
            err,
            PlannerError::DaysOutOfRange {
                days: -3,
                min: 10,
                max: 20
            }
        );
    }

    #[test]
    fn accepts_unsigned_input() {
        assert_eq!(DayRange::default().check(30u32), Ok(30));
    }
}
