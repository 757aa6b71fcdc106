//! The user's current filter selection.
//!
//! `FilterState` is plain data owned by the caller. Set-valued dimensions are
//! `BTreeSet`s, so equality is order-insensitive and an empty set means "no
//! restriction on this dimension".

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::cascade::FilterOptions;
use super::predicate::Predicate;
use crate::domain::foundation::Month;
use crate::domain::period::PeriodFilter;
use crate::domain::production::Column;

/// A structural (non-temporal) filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Unit,
    SubArea,
    Specialty,
    Category,
    AttendanceType,
    ServiceType,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Unit,
        Dimension::SubArea,
        Dimension::Specialty,
        Dimension::Category,
        Dimension::AttendanceType,
        Dimension::ServiceType,
    ];

    pub fn column(&self) -> Column {
        match self {
            Dimension::Unit => Column::Unit,
            Dimension::SubArea => Column::SubArea,
            Dimension::Specialty => Column::Specialty,
            Dimension::Category => Column::Category,
            Dimension::AttendanceType => Column::AttendanceType,
            Dimension::ServiceType => Column::ServiceType,
        }
    }
}

/// A (year, month) pair picked for one side of comparison mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSelection {
    pub year: Option<i32>,
    pub month: Option<Month>,
}

impl PeriodSelection {
    pub fn new(year: i32, month: Month) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    /// Both year and month, if both are set.
    pub fn complete(&self) -> Option<(i32, Month)> {
        Some((self.year?, self.month?))
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.month, self.year) {
            (Some(month), Some(year)) => write!(f, "{} {}", month, year),
            (Some(month), None) => write!(f, "{}", month),
            (None, Some(year)) => write!(f, "{}", year),
            (None, None) => Ok(()),
        }
    }
}

/// Current values of every filter control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub years: BTreeSet<i32>,
    pub month: Option<Month>,
    pub units: BTreeSet<String>,
    pub sub_areas: BTreeSet<String>,
    pub specialties: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub attendance_types: BTreeSet<String>,
    pub service_types: BTreeSet<String>,
    pub compare_mode: bool,
    pub compare_a: PeriodSelection,
    pub compare_b: PeriodSelection,
}

impl FilterState {
    pub fn selection(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Unit => &self.units,
            Dimension::SubArea => &self.sub_areas,
            Dimension::Specialty => &self.specialties,
            Dimension::Category => &self.categories,
            Dimension::AttendanceType => &self.attendance_types,
            Dimension::ServiceType => &self.service_types,
        }
    }

    pub fn selection_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Unit => &mut self.units,
            Dimension::SubArea => &mut self.sub_areas,
            Dimension::Specialty => &mut self.specialties,
            Dimension::Category => &mut self.categories,
            Dimension::AttendanceType => &mut self.attendance_types,
            Dimension::ServiceType => &mut self.service_types,
        }
    }

    /// Adds `value` to the dimension's selection.
    pub fn with_selected(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.selection_mut(dimension).insert(value.into());
        self
    }

    /// Restriction over every structural dimension; no temporal clause.
    pub fn structural_predicate(&self) -> Predicate {
        Dimension::ALL
            .iter()
            .fold(Predicate::all(), |predicate, dimension| {
                predicate.and_in(dimension.column(), self.selection(*dimension).iter().cloned())
            })
    }

    /// The period KPIs are computed for.
    ///
    /// In comparison mode period A replaces the regular year/month selection.
    pub fn effective_period(&self) -> PeriodFilter {
        if self.compare_mode {
            PeriodFilter {
                years: self.compare_a.year.into_iter().collect(),
                month: self.compare_a.month,
            }
        } else {
            PeriodFilter {
                years: self.years.clone(),
                month: self.month,
            }
        }
    }

    /// Both comparison periods, when comparison mode is on and both are complete.
    pub fn comparison_periods(&self) -> Option<((i32, Month), (i32, Month))> {
        if !self.compare_mode {
            return None;
        }
        Some((self.compare_a.complete()?, self.compare_b.complete()?))
    }

    /// Display label for comparison period A.
    pub fn compare_label_a(&self) -> String {
        label_or(&self.compare_a, "Mes A")
    }

    /// Display label for comparison period B.
    pub fn compare_label_b(&self) -> String {
        label_or(&self.compare_b, "Mes B")
    }

    /// Fills the initial selections from the option catalog.
    ///
    /// Selects the most recent year and the first available month, and seeds
    /// any unset comparison field: A takes the most recent year, B the second
    /// most recent (or the same one when only one exists), both the first month.
    pub fn with_defaults(mut self, options: &FilterOptions) -> Self {
        let latest_year = options.years.first().copied();
        let first_month = options.months.first().copied();

        if let Some(year) = latest_year {
            self.years = BTreeSet::from([year]);
        }
        if let Some(month) = first_month {
            self.month = Some(month);
        }

        if self.compare_a.year.is_none() {
            self.compare_a.year = latest_year;
        }
        if self.compare_b.year.is_none() {
            self.compare_b.year = options.years.get(1).copied().or(latest_year);
        }
        if self.compare_a.month.is_none() {
            self.compare_a.month = first_month;
        }
        if self.compare_b.month.is_none() {
            self.compare_b.month = first_month;
        }
        self
    }
}

fn label_or(selection: &PeriodSelection, fallback: &str) -> String {
    match selection.complete() {
        Some(_) => selection.to_string(),
        None => fallback.to_string(),
    }
}
