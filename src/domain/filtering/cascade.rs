//! Option catalogs and the pure repair step of the cascading filters.
//!
//! Sub-areas depend on the unit selection and specialties depend on both
//! units and sub-areas. After any structural change the caller computes the
//! fresh [`DependentOptions`] and runs [`repair`] to drop selections that can
//! no longer match anything.

use serde::Serialize;
use std::collections::BTreeSet;

use super::filter_state::FilterState;
use crate::domain::foundation::Month;

/// Every value each filter control may offer, loaded once per dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Most recent first.
    pub years: Vec<i32>,
    /// Calendar order.
    pub months: Vec<Month>,
    pub units: Vec<String>,
    pub sub_areas: Vec<String>,
    pub specialties: Vec<String>,
}

/// Valid values for the dimensions that depend on other selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentOptions {
    pub sub_areas: BTreeSet<String>,
    pub specialties: BTreeSet<String>,
}

/// Keeps only the selected values present in `valid`.
pub fn retain_valid(selected: &BTreeSet<String>, valid: &BTreeSet<String>) -> BTreeSet<String> {
    selected.intersection(valid).cloned().collect()
}

/// Drops sub-area and specialty selections absent from `options`.
///
/// Every other field is carried over untouched.
pub fn repair(state: &FilterState, options: &DependentOptions) -> FilterState {
    FilterState {
        sub_areas: retain_valid(&state.sub_areas, &options.sub_areas),
        specialties: retain_valid(&state.specialties, &options.specialties),
        ..state.clone()
    }
}
