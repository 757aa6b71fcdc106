//! Cutoff dates and the previous-period rule.
//!
//! Two different notions of "previous" live here:
//!
//! - the **previous cutoff** is always one calendar month before the current
//!   cutoff and anchors the floating-liability trend;
//! - the **previous period** mirrors the user's own selection (previous month
//!   for a month selection, previous year for a year selection) and anchors
//!   every other trend. It only exists when exactly one year is selected.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use super::reference::PeriodReference;
use crate::domain::filtering::{FilterState, Predicate};
use crate::domain::foundation::{Month, ValidationError};
use crate::domain::production::Column;

/// Which date a period restriction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateBasis {
    /// Confirmation date; drives confirmed KPIs.
    Confirmation,
    /// Completion date; drives realized KPIs and series.
    Completion,
}

impl DateBasis {
    pub fn year_column(&self) -> Column {
        match self {
            DateBasis::Confirmation => Column::ConfirmationYear,
            DateBasis::Completion => Column::CompletionYear,
        }
    }

    pub fn month_column(&self) -> Column {
        match self {
            DateBasis::Confirmation => Column::ConfirmationMonthNumber,
            DateBasis::Completion => Column::CompletionMonthNumber,
        }
    }
}

/// A temporal restriction: a set of years and at most one month.
///
/// Empty `years` and `None` month mean "all years" and "all months".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFilter {
    pub years: BTreeSet<i32>,
    pub month: Option<Month>,
}

impl PeriodFilter {
    pub fn single(year: i32, month: Option<Month>) -> Self {
        Self {
            years: BTreeSet::from([year]),
            month,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.years.is_empty() && self.month.is_none()
    }

    /// Clauses restricting the date chosen by `basis` to this period.
    pub fn predicate(&self, basis: DateBasis) -> Predicate {
        let predicate = Predicate::all().and_in(basis.year_column(), self.years.iter().copied());
        match self.month {
            Some(month) => predicate.and_equals(basis.month_column(), i64::from(month.number())),
            None => predicate,
        }
    }

    /// The period to compare against for trends, if one is defined.
    ///
    /// - one year and one month: the previous month (December of the prior
    ///   year for January);
    /// - one year and no month: the prior year;
    /// - zero or several years: none.
    pub fn previous(&self) -> Option<PeriodFilter> {
        if self.years.len() != 1 {
            return None;
        }
        let year = *self.years.iter().next()?;
        match self.month {
            Some(month) => {
                let (prev_year, prev_month) = month.previous_in(year);
                Some(PeriodFilter::single(prev_year, Some(prev_month)))
            }
            None => Some(PeriodFilter::single(year - 1, None)),
        }
    }
}

/// Everything the pipeline needs to know about dates for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutoffPlan {
    /// Period the KPIs are computed for.
    pub current_period: PeriodFilter,
    /// Month whose last day is the current cutoff.
    pub current: PeriodReference,
    /// Month whose last day is the previous cutoff.
    pub previous: PeriodReference,
    /// Comparison period for trends; `None` means trends are null.
    pub previous_period: Option<PeriodFilter>,
}

impl CutoffPlan {
    pub fn current_cutoff(&self) -> NaiveDate {
        self.current.last_day()
    }

    pub fn previous_cutoff(&self) -> NaiveDate {
        self.previous.last_day()
    }
}

/// Derives cutoffs and the previous period from the filter selection.
///
/// The cutoff year is the largest selected year (or the current year), the
/// cutoff month the selected month (or December). With no year and no month
/// selected the cutoff is the end of the current month instead.
pub fn compute_cutoffs(state: &FilterState, today: NaiveDate) -> Result<CutoffPlan, ValidationError> {
    let current_period = state.effective_period();
    let today_ref = PeriodReference::containing(today)?;

    let current = match (current_period.years.iter().max(), current_period.month) {
        (None, None) => today_ref,
        (Some(year), month) => PeriodReference::new(*year, month.unwrap_or(Month::December))?,
        (None, Some(month)) => PeriodReference::new(today_ref.year(), month)?,
    };
    let previous = current.previous()?;
    let previous_period = current_period.previous();

    Ok(CutoffPlan {
        current_period,
        current,
        previous,
        previous_period,
    })
}
