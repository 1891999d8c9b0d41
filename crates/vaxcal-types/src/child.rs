//! Child identity and age arithmetic

use crate::calendar::AgeUnit;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The child whose immunization status is being tracked.
///
/// Supplied by an external collaborator; only identity and birth date are
/// consumed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub birth_date: NaiveDate,
}

impl Child {
    /// Create a child reference
    pub fn new(id: impl Into<String>, birth_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            birth_date,
        }
    }

    /// Completed age on `on_date`, expressed in `unit`. Dates before the
    /// birth date clamp to zero.
    pub fn age_in(&self, unit: AgeUnit, on_date: NaiveDate) -> u32 {
        if on_date <= self.birth_date {
            return 0;
        }
        match unit {
            AgeUnit::Weeks => ((on_date - self.birth_date).num_days() / 7) as u32,
            AgeUnit::Months => whole_months(self.birth_date, on_date),
            AgeUnit::Years => whole_months(self.birth_date, on_date) / 12,
        }
    }
}

/// Whole calendar months elapsed between two dates
fn whole_months(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_in_weeks() {
        let child = Child::new("c1", date(2025, 1, 1));
        assert_eq!(child.age_in(AgeUnit::Weeks, date(2025, 2, 12)), 6);
        assert_eq!(child.age_in(AgeUnit::Weeks, date(2025, 1, 7)), 0);
        assert_eq!(child.age_in(AgeUnit::Weeks, date(2025, 1, 8)), 1);
    }

    #[test]
    fn test_age_in_months_honors_day_of_month() {
        let child = Child::new("c1", date(2025, 1, 15));
        assert_eq!(child.age_in(AgeUnit::Months, date(2025, 4, 14)), 2);
        assert_eq!(child.age_in(AgeUnit::Months, date(2025, 4, 15)), 3);
    }

    #[test]
    fn test_age_in_years() {
        let child = Child::new("c1", date(2020, 6, 1));
        assert_eq!(child.age_in(AgeUnit::Years, date(2025, 5, 31)), 4);
        assert_eq!(child.age_in(AgeUnit::Years, date(2025, 6, 1)), 5);
    }

    #[test]
    fn test_age_before_birth_clamps_to_zero() {
        let child = Child::new("c1", date(2025, 1, 1));
        assert_eq!(child.age_in(AgeUnit::Weeks, date(2024, 12, 1)), 0);
    }
}
