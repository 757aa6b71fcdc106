//! Typed predicate builder.
//!
//! A [`Predicate`] is a conjunction of [`Clause`]s over the production
//! columns. Adapters translate it into their own query language (bound SQL
//! parameters for PostgreSQL, direct evaluation for the in-memory table).
//!
//! Empty selections never produce a clause: `and_in` with no values leaves
//! the predicate untouched, so an `IN ()` can never reach a backend.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::production::{Column, ProductionRow, Value};

/// A single condition over one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Clause {
    /// Column equals the value.
    Equals { column: Column, value: Value },

    /// Column equals one of the values. Never empty.
    In { column: Column, values: Vec<Value> },

    /// Text column equals the value after trimming surrounding spaces.
    ///
    /// Only U+0020 is stripped, matching SQL `TRIM`.
    TrimmedEquals { column: Column, value: String },

    IsNull { column: Column },

    IsNotNull { column: Column },

    /// Text column is neither null nor the empty string.
    NotBlank { column: Column },

    /// Date column is on or before the bound.
    OnOrBefore { column: Column, date: NaiveDate },

    /// Date column lies within the inclusive range.
    Between {
        column: Column,
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl Clause {
    /// Column the clause constrains.
    pub fn column(&self) -> Column {
        match self {
            Clause::Equals { column, .. }
            | Clause::In { column, .. }
            | Clause::TrimmedEquals { column, .. }
            | Clause::IsNull { column }
            | Clause::IsNotNull { column }
            | Clause::NotBlank { column }
            | Clause::OnOrBefore { column, .. }
            | Clause::Between { column, .. } => *column,
        }
    }

    /// Evaluates the clause against one row.
    ///
    /// Null cells never satisfy a comparison.
    pub fn matches(&self, row: &ProductionRow) -> bool {
        let cell = row.value(self.column());
        match self {
            Clause::Equals { value, .. } => !cell.is_null() && &cell == value,
            Clause::In { values, .. } => !cell.is_null() && values.contains(&cell),
            Clause::TrimmedEquals { value, .. } => cell
                .as_text()
                .is_some_and(|text| text.trim_matches(' ') == value),
            Clause::IsNull { .. } => cell.is_null(),
            Clause::IsNotNull { .. } => !cell.is_null(),
            Clause::NotBlank { .. } => cell.as_text().is_some_and(|text| !text.is_empty()),
            Clause::OnOrBefore { date, .. } => cell.as_date().is_some_and(|d| d <= *date),
            Clause::Between { from, to, .. } => {
                cell.as_date().is_some_and(|d| d >= *from && d <= *to)
            }
        }
    }
}

/// Conjunction of clauses. The empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Predicate with no restriction.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn and_equals(self, column: Column, value: impl Into<Value>) -> Self {
        self.and(Clause::Equals {
            column,
            value: value.into(),
        })
    }

    /// Adds a membership clause, or nothing at all when `values` is empty.
    pub fn and_in<I, V>(self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        self.and(Clause::In { column, values })
    }

    pub fn and_trimmed_equals(self, column: Column, value: impl Into<String>) -> Self {
        self.and(Clause::TrimmedEquals {
            column,
            value: value.into(),
        })
    }

    pub fn and_null(self, column: Column) -> Self {
        self.and(Clause::IsNull { column })
    }

    pub fn and_not_null(self, column: Column) -> Self {
        self.and(Clause::IsNotNull { column })
    }

    pub fn and_not_blank(self, column: Column) -> Self {
        self.and(Clause::NotBlank { column })
    }

    pub fn and_on_or_before(self, column: Column, date: NaiveDate) -> Self {
        self.and(Clause::OnOrBefore { column, date })
    }

    pub fn and_between(self, column: Column, from: NaiveDate, to: NaiveDate) -> Self {
        self.and(Clause::Between { column, from, to })
    }

    /// Appends every clause of `other`.
    pub fn merge(mut self, other: &Predicate) -> Self {
        self.clauses.extend(other.clauses.iter().cloned());
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates the conjunction against one row.
    pub fn matches(&self, row: &ProductionRow) -> bool {
        self.clauses.iter().all(|clause| clause.matches(row))
    }
}
