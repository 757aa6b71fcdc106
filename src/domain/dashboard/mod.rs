//! Dashboard outputs - the bundle and the pure rules that shape it.

pub mod backlog;
pub mod breakdown;
pub mod bundle;
pub mod comparison;
pub mod health;
pub mod trend;

pub use backlog::AgingBucket;
pub use breakdown::{Breakdown, ATTENDANCE_TYPES, SERVICE_TYPES};
pub use bundle::{
    AgingRow, BreakdownRow, BundleMeta, DailyPoint, DashboardBundle, KpiSummary, MonthlyPoint,
    Totals,
};
pub use comparison::{zip_daily, ComparisonEntry, ComparisonSeries, DailyPair, COLOR_A, COLOR_B};
pub use health::HealthStatus;
pub use trend::{
    average_ticket, ratio_percent, trend_percent, KpiMetric, TrendAlert, TrendDirection, TrendSet,
    TREND_ALERT_THRESHOLD,
};
