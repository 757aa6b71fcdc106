//! Production Insights - Filter-to-aggregate engine for healthcare production
//! dashboards.
//!
//! A dataset of confirmed and completed services is filtered by period and
//! structural dimensions, then reduced into KPIs, trends, backlog aging,
//! breakdowns and daily/monthly series, published as one consistent bundle.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
