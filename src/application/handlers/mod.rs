//! Application handlers.
//!
//! Query handlers that orchestrate domain operations over the ports.

pub mod dashboard;

pub use dashboard::{
    ComputeDashboardHandler, ComputeDashboardQuery, ComputeDashboardResult, DashboardError,
    DashboardRefreshService, LoadFilterOptionsHandler, LoadFilterOptionsQuery,
    LoadFilterOptionsResult, PublishedBundle, RefreshOutcome, ResolveDependentFiltersHandler,
    ResolveDependentFiltersQuery, ResolveDependentFiltersResult,
};
