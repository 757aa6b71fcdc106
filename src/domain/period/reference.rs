//! A resolved calendar month used to anchor cutoff dates.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::domain::foundation::{Month, ValidationError};

/// Smallest year a period may reference.
pub const MIN_YEAR: i32 = 1;

/// Largest year a period may reference.
pub const MAX_YEAR: i32 = 9999;

/// A (year, month) pair together with the last calendar day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReference {
    year: i32,
    month: Month,
    last_day: NaiveDate,
}

impl PeriodReference {
    /// Creates a reference, rejecting years outside [`MIN_YEAR`]..=[`MAX_YEAR`].
    pub fn new(year: i32, month: Month) -> Result<Self, ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::out_of_range(
                "year",
                MIN_YEAR.into(),
                MAX_YEAR.into(),
                year.into(),
            ));
        }
        let last_day = NaiveDate::from_ymd_opt(year, month.number(), 1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                ValidationError::invalid_format("date", format!("{year}-{:02}", month.number()))
            })?;
        Ok(Self {
            year,
            month,
            last_day,
        })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, ValidationError> {
        Self::new(date.year(), Month::ALL[date.month0() as usize])
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// The calendar month before this one, rolling January back to December.
    pub fn previous(&self) -> Result<Self, ValidationError> {
        let (year, month) = self.month.previous_in(self.year);
        Self::new(year, month)
    }
}

impl fmt::Display for PeriodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month.number())
    }
}
