//! Application layer - Queries and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every handler is read-only: the production relation is immutable once
//! loaded.

pub mod handlers;

pub use handlers::{
    // Filter handlers
    LoadFilterOptionsHandler, LoadFilterOptionsQuery, LoadFilterOptionsResult,
    ResolveDependentFiltersHandler, ResolveDependentFiltersQuery, ResolveDependentFiltersResult,
    // Dashboard runs
    ComputeDashboardHandler, ComputeDashboardQuery, ComputeDashboardResult, DashboardError,
    DashboardRefreshService, PublishedBundle, RefreshOutcome,
};
