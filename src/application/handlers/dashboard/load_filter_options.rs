//! LoadFilterOptionsHandler - Query handler for the filter option catalog.
//!
//! Collects every value each filter control may offer: confirmation years
//! (most recent first), months present (calendar order), units, and the
//! non-blank sub-areas and specialties.

use std::sync::Arc;

use crate::domain::filtering::{FilterOptions, Predicate};
use crate::domain::foundation::Month;
use crate::domain::production::{Column, Value};
use crate::ports::{RelationError, RelationProvider};

use super::DashboardError;

/// Query to load the option catalog. Carries no parameters; options always
/// describe the whole dataset.
#[derive(Debug, Clone, Default)]
pub struct LoadFilterOptionsQuery;

/// Result of a successful option catalog load.
pub type LoadFilterOptionsResult = FilterOptions;

/// Handler for loading filter options.
pub struct LoadFilterOptionsHandler {
    relation: Arc<dyn RelationProvider>,
}

impl LoadFilterOptionsHandler {
    pub fn new(relation: Arc<dyn RelationProvider>) -> Self {
        Self { relation }
    }

    pub async fn handle(
        &self,
        _query: LoadFilterOptionsQuery,
    ) -> Result<LoadFilterOptionsResult, DashboardError> {
        let all = Predicate::all();
        let relation = self.relation.as_ref();

        let (years, months, units, sub_areas, specialties) = tokio::try_join!(
            relation.distinct_values(Column::ConfirmationYear, &all),
            relation.distinct_values(Column::ConfirmationMonthNumber, &all),
            relation.distinct_values(Column::Unit, &all),
            non_blank_values(relation, Column::SubArea),
            non_blank_values(relation, Column::Specialty),
        )?;

        let mut years = integers(&years)?
            .into_iter()
            .map(|year| {
                i32::try_from(year)
                    .map_err(|_| RelationError::decode(format!("year out of range: {year}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        years.sort_unstable_by(|a, b| b.cmp(a));

        let mut months = integers(&months)?
            .into_iter()
            .map(|number| {
                u32::try_from(number)
                    .ok()
                    .and_then(|n| Month::from_number(n).ok())
                    .ok_or_else(|| RelationError::decode(format!("month out of range: {number}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        months.sort();

        let options = FilterOptions {
            years,
            months,
            units: texts(&units)?,
            sub_areas: texts(&sub_areas)?,
            specialties: texts(&specialties)?,
        };

        tracing::debug!(
            years = options.years.len(),
            units = options.units.len(),
            sub_areas = options.sub_areas.len(),
            specialties = options.specialties.len(),
            "Loaded filter options"
        );
        Ok(options)
    }
}

async fn non_blank_values(
    relation: &dyn RelationProvider,
    column: Column,
) -> Result<Vec<Value>, RelationError> {
    relation
        .distinct_values(column, &Predicate::all().and_not_blank(column))
        .await
}

pub(super) fn integers(values: &[Value]) -> Result<Vec<i64>, RelationError> {
    values
        .iter()
        .map(|value| {
            value
                .as_integer()
                .ok_or_else(|| RelationError::decode(format!("expected integer, got {value:?}")))
        })
        .collect()
}

pub(super) fn texts(values: &[Value]) -> Result<Vec<String>, RelationError> {
    values
        .iter()
        .map(|value| {
            value
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| RelationError::decode(format!("expected text, got {value:?}")))
        })
        .collect()
}
