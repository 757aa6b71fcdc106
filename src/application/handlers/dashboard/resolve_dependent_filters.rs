//! ResolveDependentFiltersHandler - Cascading filter resolution.
//!
//! Sub-areas valid under the unit selection are computed first; specialties
//! are then computed under the units and the *repaired* sub-area selection.
//! Selections absent from their fresh option set are dropped.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::filtering::{repair, retain_valid, DependentOptions, FilterState, Predicate};
use crate::domain::production::Column;
use crate::ports::RelationProvider;

use super::load_filter_options::texts;
use super::DashboardError;

/// Query to resolve dependent filters for a selection.
#[derive(Debug, Clone)]
pub struct ResolveDependentFiltersQuery {
    pub filters: FilterState,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveDependentFiltersResult {
    /// The selection with invalid sub-areas and specialties removed.
    pub filters: FilterState,
    /// Fresh option sets for the dependent controls.
    pub options: DependentOptions,
    /// False when repair left the selection as it was. Set comparison, so
    /// reordering alone never counts as a change.
    pub changed: bool,
}

/// Handler for cascading filter resolution.
///
/// On failure nothing is repaired; the caller keeps its current selection.
pub struct ResolveDependentFiltersHandler {
    relation: Arc<dyn RelationProvider>,
}

impl ResolveDependentFiltersHandler {
    pub fn new(relation: Arc<dyn RelationProvider>) -> Self {
        Self { relation }
    }

    pub async fn handle(
        &self,
        query: ResolveDependentFiltersQuery,
    ) -> Result<ResolveDependentFiltersResult, DashboardError> {
        let filters = query.filters;
        let by_unit = Predicate::all().and_in(Column::Unit, filters.units.iter().cloned());

        let sub_areas = self
            .relation
            .distinct_values(
                Column::SubArea,
                &by_unit.clone().and_not_blank(Column::SubArea),
            )
            .await?;
        let sub_areas: BTreeSet<String> = texts(&sub_areas)?.into_iter().collect();
        let kept_sub_areas = retain_valid(&filters.sub_areas, &sub_areas);

        let by_unit_and_sub_area = by_unit
            .and_in(Column::SubArea, kept_sub_areas.iter().cloned())
            .and_not_blank(Column::Specialty);
        let specialties = self
            .relation
            .distinct_values(Column::Specialty, &by_unit_and_sub_area)
            .await?;
        let specialties: BTreeSet<String> = texts(&specialties)?.into_iter().collect();

        let options = DependentOptions {
            sub_areas,
            specialties,
        };
        let repaired = repair(&filters, &options);
        let changed = repaired != filters;

        if changed {
            tracing::debug!(
                dropped_sub_areas = filters.sub_areas.len() - repaired.sub_areas.len(),
                dropped_specialties = filters.specialties.len() - repaired.specialties.len(),
                "Repaired dependent filter selection"
            );
        }

        Ok(ResolveDependentFiltersResult {
            filters: repaired,
            options,
            changed,
        })
    }
}
