//! Production records and their derived temporal fields.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::column::{Column, Value};
use crate::domain::foundation::Month;

/// Status value that marks a record as a confirmed (booked) service.
pub const CONFIRMED_STATUS: &str = "Confirmado";

/// One row of the production dataset as delivered by the loading layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub patient_id: String,
    pub company_id: String,
    pub confirmation_date: NaiveDate,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    pub amount: f64,
    pub status: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub sub_area: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub attendance_type: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
}

/// Year, month and day split out of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: Month,
    pub day: u32,
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            // chrono months are always 1..=12
            month: Month::ALL[date.month0() as usize],
            day: date.day(),
        }
    }
}

/// A record plus the temporal fields derived from its two dates.
///
/// Derivation happens once when the relation is built; queries only ever
/// read the stored parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRow {
    record: ProductionRecord,
    confirmation: DateParts,
    completion: Option<DateParts>,
}

impl ProductionRow {
    pub fn new(record: ProductionRecord) -> Self {
        let confirmation = DateParts::from(record.confirmation_date);
        let completion = record.completion_date.map(DateParts::from);
        Self {
            record,
            confirmation,
            completion,
        }
    }

    /// Numeric value of a column, if it has one.
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Amount => Some(self.record.amount),
            other => self.value(other).as_integer().map(|i| i as f64),
        }
    }

    /// Cell value for a non-monetary column.
    ///
    /// [`Column::Amount`] has no [`Value`] representation and reads as null;
    /// use [`ProductionRow::numeric`] for it.
    pub fn value(&self, column: Column) -> Value {
        let r = &self.record;
        match column {
            Column::PatientId => Value::text(r.patient_id.clone()),
            Column::CompanyId => Value::text(r.company_id.clone()),
            Column::ConfirmationDate => Value::Date(r.confirmation_date),
            Column::CompletionDate => r.completion_date.into(),
            Column::Amount => Value::Null,
            Column::Status => Value::text(r.status.clone()),
            Column::Unit => r.unit.clone().into(),
            Column::SubArea => r.sub_area.clone().into(),
            Column::Specialty => r.specialty.clone().into(),
            Column::Category => r.category.clone().into(),
            Column::AttendanceType => r.attendance_type.clone().into(),
            Column::ServiceType => r.service_type.clone().into(),
            Column::ConfirmationYear => Value::Integer(self.confirmation.year.into()),
            Column::ConfirmationMonthNumber => {
                Value::Integer(self.confirmation.month.number().into())
            }
            Column::ConfirmationMonthName => Value::text(self.confirmation.month.name()),
            Column::CompletionYear => self.completion.map(|c| i64::from(c.year)).into(),
            Column::CompletionMonthNumber => {
                self.completion.map(|c| i64::from(c.month.number())).into()
            }
            Column::CompletionMonthName => self
                .completion
                .map(|c| c.month.name().to_string())
                .into(),
            Column::CompletionDay => self.completion.map(|c| i64::from(c.day)).into(),
        }
    }
}

impl From<ProductionRecord> for ProductionRow {
    fn from(record: ProductionRecord) -> Self {
        Self::new(record)
    }
}
