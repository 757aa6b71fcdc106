use chrono::NaiveDate;
use serde::Serialize;

use super::backlog::AgingBucket;
use super::comparison::ComparisonSeries;
use super::health::HealthStatus;
use super::trend::{TrendAlert, TrendSet};
use crate::domain::foundation::{Month, RunId};
use crate::domain::period::PeriodFilter;

/// Everything one recomputation produces - the full dashboard state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBundle {
    pub meta: BundleMeta,

    /// Scalar KPIs for the current period
    pub kpis: KpiSummary,

    /// Percentage change against the previous period (null when undefined)
    pub trends: TrendSet,
    pub alerts: Vec<TrendAlert>,
    pub health: HealthStatus,

    /// Always four rows, in bucket order
    pub backlog_aging: Vec<AgingRow>,

    /// Breakdowns over the realized set, count descending
    pub categories: Vec<BreakdownRow>,
    pub service_types: Vec<BreakdownRow>,
    pub attendance_types: Vec<BreakdownRow>,
    pub top_sub_areas: Vec<BreakdownRow>,
    pub lead_time_sub_areas: Vec<BreakdownRow>,

    /// Realized series
    pub daily_realized: Vec<DailyPoint>,
    pub monthly_realized: Vec<MonthlyPoint>,

    /// Only present in comparison mode with both periods complete
    pub comparison: Option<ComparisonSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    pub run_id: RunId,
    pub current_period: PeriodFilter,
    pub current_cutoff: NaiveDate,
    pub previous_cutoff: NaiveDate,
    pub has_previous_period: bool,
    pub previous_period: Option<PeriodFilter>,
}

/// A count together with the summed monetary amount of the same rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub count: u64,
    pub value: f64,
}

impl Totals {
    pub fn new(count: u64, value: f64) -> Self {
        Self { count, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub confirmed_count: u64,
    pub confirmed_value: f64,

    pub realized_count: u64,
    pub realized_value: f64,
    pub distinct_companies: u64,
    pub distinct_patients: u64,
    /// Mean days from confirmation to completion; null with no realized rows
    pub avg_days_to_completion: Option<f64>,
    pub average_ticket: f64,

    /// Percentages, 0 when the denominator is 0
    pub realization_rate_by_volume: f64,
    pub realization_rate_by_value: f64,

    pub backlog_count: u64,
    pub backlog_value: f64,

    /// Confirmed minus realized value, accumulated since the start of data
    pub floating_liability: f64,
    pub previous_floating_liability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingRow {
    pub bucket: AgingBucket,
    pub count: u64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub key: String,
    pub count: u64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// Day of month, 1-based
    pub day: u32,
    pub count: u64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: Month,
    pub month_number: u32,
    pub count: u64,
    pub value: f64,
}

#[cfg(test)]
#[path = "bundle_test.rs"]
mod bundle_test;
