//! Dashboard query handlers.
//!
//! Read-only handlers that turn filter selections into option catalogs,
//! repaired selections and complete dashboard bundles.

mod compute_dashboard;
mod errors;
mod load_filter_options;
mod queries;
mod refresh_dashboard;
mod resolve_dependent_filters;

pub use compute_dashboard::{
    ComputeDashboardHandler, ComputeDashboardQuery, ComputeDashboardResult,
};
pub use errors::DashboardError;
pub use load_filter_options::{
    LoadFilterOptionsHandler, LoadFilterOptionsQuery, LoadFilterOptionsResult,
};
pub use refresh_dashboard::{DashboardRefreshService, PublishedBundle, RefreshOutcome};
pub use resolve_dependent_filters::{
    ResolveDependentFiltersHandler, ResolveDependentFiltersQuery, ResolveDependentFiltersResult,
};
