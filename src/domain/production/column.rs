//! Schema of the production relation.
//!
//! `Column` names every attribute the engine may filter, group or aggregate
//! on, including the temporal fields derived once when the relation is built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage kind of a column, used by adapters to decode values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Integer,
    Date,
    Decimal,
}

/// A column of the production relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    PatientId,
    CompanyId,
    ConfirmationDate,
    CompletionDate,
    Amount,
    Status,
    Unit,
    SubArea,
    Specialty,
    Category,
    AttendanceType,
    ServiceType,

    // Derived from the confirmation date
    ConfirmationYear,
    ConfirmationMonthNumber,
    ConfirmationMonthName,

    // Derived from the completion date
    CompletionYear,
    CompletionMonthNumber,
    CompletionMonthName,
    CompletionDay,
}

impl Column {
    /// Physical column name used by storage backends.
    pub fn name(&self) -> &'static str {
        match self {
            Column::PatientId => "patient_id",
            Column::CompanyId => "company_id",
            Column::ConfirmationDate => "confirmation_date",
            Column::CompletionDate => "completion_date",
            Column::Amount => "amount",
            Column::Status => "status",
            Column::Unit => "unit",
            Column::SubArea => "sub_area",
            Column::Specialty => "specialty",
            Column::Category => "category",
            Column::AttendanceType => "attendance_type",
            Column::ServiceType => "service_type",
            Column::ConfirmationYear => "confirmation_year",
            Column::ConfirmationMonthNumber => "confirmation_month_number",
            Column::ConfirmationMonthName => "confirmation_month_name",
            Column::CompletionYear => "completion_year",
            Column::CompletionMonthNumber => "completion_month_number",
            Column::CompletionMonthName => "completion_month_name",
            Column::CompletionDay => "completion_day",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::ConfirmationDate | Column::CompletionDate => ColumnKind::Date,
            Column::Amount => ColumnKind::Decimal,
            Column::ConfirmationYear
            | Column::ConfirmationMonthNumber
            | Column::CompletionYear
            | Column::CompletionMonthNumber
            | Column::CompletionDay => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A scalar cell value.
///
/// Monetary amounts never appear here; they are only ever aggregated, so
/// the type stays totally ordered and usable as a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        value.map(Value::Integer).unwrap_or(Value::Null)
    }
}

impl From<Option<NaiveDate>> for Value {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(Value::Date).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_columns_are_integers() {
        assert_eq!(Column::CompletionDay.kind(), ColumnKind::Integer);
        assert_eq!(Column::ConfirmationYear.kind(), ColumnKind::Integer);
        assert_eq!(Column::CompletionMonthName.kind(), ColumnKind::Text);
    }

    #[test]
    fn amount_is_the_only_decimal_column() {
        assert_eq!(Column::Amount.kind(), ColumnKind::Decimal);
        assert_eq!(Column::Unit.kind(), ColumnKind::Text);
    }

    #[test]
    fn values_order_nulls_first() {
        let mut values = vec![Value::text("b"), Value::Null, Value::text("a")];
        values.sort();
        assert_eq!(values, vec![Value::Null, Value::text("a"), Value::text("b")]);
    }

    #[test]
    fn value_from_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Integer(3));
    }
}
