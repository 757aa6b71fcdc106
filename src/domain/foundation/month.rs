//! Calendar month value object with the canonical Portuguese naming.
//!
//! The dataset stores month names ("Janeiro" .. "Dezembro") as derived
//! columns, and the filter UI selects months by those names. Ordering is
//! always the calendar ordering, never alphabetical.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// One of the twelve calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in canonical (calendar) order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Returns the canonical display name stored in the dataset.
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "Janeiro",
            Month::February => "Fevereiro",
            Month::March => "Março",
            Month::April => "Abril",
            Month::May => "Maio",
            Month::June => "Junho",
            Month::July => "Julho",
            Month::August => "Agosto",
            Month::September => "Setembro",
            Month::October => "Outubro",
            Month::November => "Novembro",
            Month::December => "Dezembro",
        }
    }

    /// Returns the 1-based month number.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    /// Builds a month from its 1-based number.
    pub fn from_number(number: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&number) {
            return Err(ValidationError::out_of_range("month", 1, 12, number.into()));
        }
        Ok(Self::ALL[(number - 1) as usize])
    }

    /// Parses a month name.
    ///
    /// Matching ignores case, surrounding whitespace and the cedilla, so
    /// "Marco", "março" and "MARÇO" all resolve to March.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let wanted = fold(name.trim());
        Self::ALL
            .iter()
            .copied()
            .find(|month| fold(month.name()) == wanted)
            .ok_or_else(|| ValidationError::unknown_month(name))
    }

    /// Returns the month before this one, with the year it falls in.
    pub fn previous_in(&self, year: i32) -> (i32, Month) {
        match self {
            Month::January => (year - 1, Month::December),
            other => (year, Self::ALL[(other.number() - 2) as usize]),
        }
    }

    /// True for the first month in canonical order.
    pub fn is_first(&self) -> bool {
        *self == Month::January
    }
}

fn fold(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'ç' | 'Ç' => 'c',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for Month {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.name().to_string()
    }
}
