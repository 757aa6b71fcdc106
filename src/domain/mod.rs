//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `production` - Production records, schema columns and cell values
//! - `filtering` - Filter selections, cascading repair, predicate builder
//! - `period` - Cutoff dates and previous-period resolution
//! - `dashboard` - Output bundle, backlog aging, trends, health, comparison

pub mod dashboard;
pub mod filtering;
pub mod foundation;
pub mod period;
pub mod production;
