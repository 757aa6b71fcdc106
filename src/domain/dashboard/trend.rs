//! Ratios, period-over-period trends and trend alerts.
//!
//! Display ratios collapse to 0 on a zero denominator. Trends collapse to
//! `None`: a zero would read as "no change", which is not what an undefined
//! comparison means.

use serde::Serialize;

/// Absolute trend (in percent) at or above which an alert is raised.
pub const TREND_ALERT_THRESHOLD: f64 = 25.0;

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator * 100.0)
}

/// Realized value per realized record, or 0 with no records.
pub fn average_ticket(value: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    finite_or_zero(value / count as f64)
}

/// `(current - previous) / previous * 100`; `None` when previous is 0.
pub fn trend_percent(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let trend = (current - previous) / previous * 100.0;
    trend.is_finite().then_some(trend)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// KPIs that carry a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiMetric {
    ConfirmedCount,
    ConfirmedValue,
    RealizedCount,
    RealizedValue,
    AvgDaysToCompletion,
    AverageTicket,
    FloatingLiability,
}

/// Trend of every KPI that has one. `None` = no previous period, or a
/// previous value of exactly 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSet {
    pub confirmed_count: Option<f64>,
    pub confirmed_value: Option<f64>,
    pub realized_count: Option<f64>,
    pub realized_value: Option<f64>,
    pub avg_days_to_completion: Option<f64>,
    pub average_ticket: Option<f64>,
    pub floating_liability: Option<f64>,
}

impl TrendSet {
    pub fn get(&self, metric: KpiMetric) -> Option<f64> {
        match metric {
            KpiMetric::ConfirmedCount => self.confirmed_count,
            KpiMetric::ConfirmedValue => self.confirmed_value,
            KpiMetric::RealizedCount => self.realized_count,
            KpiMetric::RealizedValue => self.realized_value,
            KpiMetric::AvgDaysToCompletion => self.avg_days_to_completion,
            KpiMetric::AverageTicket => self.average_ticket,
            KpiMetric::FloatingLiability => self.floating_liability,
        }
    }

    /// Alerts for every defined trend whose magnitude reaches the threshold.
    pub fn alerts(&self) -> Vec<TrendAlert> {
        const ORDER: [KpiMetric; 7] = [
            KpiMetric::ConfirmedCount,
            KpiMetric::ConfirmedValue,
            KpiMetric::RealizedCount,
            KpiMetric::RealizedValue,
            KpiMetric::AvgDaysToCompletion,
            KpiMetric::AverageTicket,
            KpiMetric::FloatingLiability,
        ];
        ORDER
            .into_iter()
            .filter_map(|metric| {
                let trend = self.get(metric)?;
                (trend.abs() >= TREND_ALERT_THRESHOLD).then(|| TrendAlert {
                    metric,
                    trend,
                    direction: if trend > 0.0 {
                        TrendDirection::Up
                    } else {
                        TrendDirection::Down
                    },
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAlert {
    pub metric: KpiMetric,
    pub trend: f64,
    pub direction: TrendDirection,
}

#[cfg(test)]
#[path = "trend_test.rs"]
mod trend_test;
