//! Backlog aging buckets.
//!
//! Age is `cutoff - confirmation_date` in whole days. The buckets partition
//! every non-negative age, so translating each bucket into a confirmation
//! date range relative to the cutoff yields disjoint ranges whose union is
//! "confirmed on or before the cutoff".

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::domain::filtering::Predicate;
use crate::domain::production::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgingBucket {
    #[serde(rename = "0-7 dias")]
    UpToWeek,
    #[serde(rename = "8-15 dias")]
    UpToFortnight,
    #[serde(rename = "16-30 dias")]
    UpToMonth,
    #[serde(rename = "31+ dias")]
    OverMonth,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 4] = [
        AgingBucket::UpToWeek,
        AgingBucket::UpToFortnight,
        AgingBucket::UpToMonth,
        AgingBucket::OverMonth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::UpToWeek => "0-7 dias",
            AgingBucket::UpToFortnight => "8-15 dias",
            AgingBucket::UpToMonth => "16-30 dias",
            AgingBucket::OverMonth => "31+ dias",
        }
    }

    /// Inclusive age range in days; `None` upper bound means unbounded.
    pub fn days(&self) -> (u64, Option<u64>) {
        match self {
            AgingBucket::UpToWeek => (0, Some(7)),
            AgingBucket::UpToFortnight => (8, Some(15)),
            AgingBucket::UpToMonth => (16, Some(30)),
            AgingBucket::OverMonth => (31, None),
        }
    }

    /// Confirmation-date restriction selecting the rows of this bucket.
    pub fn predicate(&self, cutoff: NaiveDate) -> Predicate {
        match self.days() {
            (min, Some(max)) => Predicate::all().and_between(
                Column::ConfirmationDate,
                days_before(cutoff, max),
                days_before(cutoff, min),
            ),
            (min, None) => {
                Predicate::all().and_on_or_before(Column::ConfirmationDate, days_before(cutoff, min))
            }
        }
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}
