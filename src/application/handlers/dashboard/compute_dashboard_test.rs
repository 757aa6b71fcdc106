use super::*;
use crate::adapters::{FixedClock, InMemoryProductionTable};
use crate::domain::dashboard::{AgingBucket, KpiMetric, TrendDirection};
use crate::domain::filtering::{Dimension, PeriodSelection, Predicate};
use crate::domain::foundation::Month;
use crate::domain::production::{Column, ProductionRecord, Value};
use crate::ports::{Expression, GroupQuery, GroupRow, RelationError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(
    patient: &str,
    confirmed: NaiveDate,
    completed: Option<NaiveDate>,
    amount: f64,
) -> ProductionRecord {
    ProductionRecord {
        patient_id: patient.to_string(),
        company_id: "ACME".to_string(),
        confirmation_date: confirmed,
        completion_date: completed,
        amount,
        status: "Confirmado".to_string(),
        unit: Some("Norte".to_string()),
        sub_area: Some("Cardiologia".to_string()),
        specialty: Some("Eletro".to_string()),
        category: Some("Exame".to_string()),
        attendance_type: Some("Particular".to_string()),
        service_type: Some("Procedimento".to_string()),
    }
}

fn handler(records: Vec<ProductionRecord>) -> ComputeDashboardHandler {
    ComputeDashboardHandler::new(
        Arc::new(InMemoryProductionTable::new(records)),
        Arc::new(FixedClock(date(2026, 10, 15))),
    )
}

fn month_filter(year: i32, month: Month) -> FilterState {
    FilterState {
        years: BTreeSet::from([year]),
        month: Some(month),
        ..Default::default()
    }
}

async fn run(handler: &ComputeDashboardHandler, filters: FilterState) -> DashboardBundle {
    handler
        .handle(ComputeDashboardQuery { filters })
        .await
        .unwrap()
}

/// Delegates to an in-memory table but fails every grouped query.
struct FailingGroups {
    inner: InMemoryProductionTable,
}

#[async_trait]
impl RelationProvider for FailingGroups {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RelationError> {
        self.inner.count(predicate).await
    }

    async fn sum(&self, column: Column, predicate: &Predicate) -> Result<f64, RelationError> {
        self.inner.sum(column, predicate).await
    }

    async fn avg(
        &self,
        expression: Expression,
        predicate: &Predicate,
    ) -> Result<Option<f64>, RelationError> {
        self.inner.avg(expression, predicate).await
    }

    async fn distinct_count(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<u64, RelationError> {
        self.inner.distinct_count(column, predicate).await
    }

    async fn group_by(&self, _query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError> {
        Err(RelationError::connection("connection reset"))
    }

    async fn distinct_values(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, RelationError> {
        self.inner.distinct_values(column, predicate).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// KPIs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_confirmed_and_realized_use_their_own_dates() {
    let handler = handler(vec![record(
        "P1",
        date(2026, 1, 20),
        Some(date(2026, 2, 3)),
        300.0,
    )]);

    let january = run(&handler, month_filter(2026, Month::January)).await;
    assert_eq!(january.kpis.confirmed_count, 1);
    assert_eq!(january.kpis.confirmed_value, 300.0);
    assert_eq!(january.kpis.realized_count, 0);

    let february = run(&handler, month_filter(2026, Month::February)).await;
    assert_eq!(february.kpis.confirmed_count, 0);
    assert_eq!(february.kpis.realized_count, 1);
    assert_eq!(february.kpis.avg_days_to_completion, Some(14.0));
    assert_eq!(february.kpis.realization_rate_by_volume, 0.0);
    assert_eq!(february.kpis.realization_rate_by_value, 0.0);
}

#[tokio::test]
async fn test_realized_kpis_and_rates() {
    let handler = handler(vec![
        record("P1", date(2026, 3, 1), Some(date(2026, 3, 11)), 100.0),
        record("P2", date(2026, 3, 2), Some(date(2026, 3, 22)), 300.0),
        record("P2", date(2026, 3, 5), None, 600.0),
        record("P3", date(2026, 3, 6), None, 1000.0),
    ]);

    let bundle = run(&handler, month_filter(2026, Month::March)).await;

    assert_eq!(bundle.kpis.confirmed_count, 4);
    assert_eq!(bundle.kpis.realized_count, 2);
    assert_eq!(bundle.kpis.realized_value, 400.0);
    assert_eq!(bundle.kpis.distinct_patients, 2);
    assert_eq!(bundle.kpis.distinct_companies, 1);
    assert_eq!(bundle.kpis.avg_days_to_completion, Some(15.0));
    assert_eq!(bundle.kpis.average_ticket, 200.0);
    assert_eq!(bundle.kpis.realization_rate_by_volume, 50.0);
    assert_eq!(bundle.kpis.realization_rate_by_value, 20.0);
}

#[tokio::test]
async fn test_empty_selection_produces_zeroed_bundle() {
    let bundle = run(&handler(vec![]), month_filter(2026, Month::March)).await;

    assert_eq!(bundle.kpis.confirmed_count, 0);
    assert_eq!(bundle.kpis.realization_rate_by_volume, 0.0);
    assert_eq!(bundle.kpis.average_ticket, 0.0);
    assert_eq!(bundle.kpis.avg_days_to_completion, None);
    assert!(bundle.daily_realized.is_empty());
    assert_eq!(bundle.backlog_aging.len(), 4);
    assert!(bundle.alerts.is_empty());
}

#[tokio::test]
async fn test_structural_filters_restrict_every_set() {
    let mut other_unit = record("P9", date(2026, 3, 1), Some(date(2026, 3, 2)), 50.0);
    other_unit.unit = Some("Sul".to_string());
    let handler = handler(vec![
        record("P1", date(2026, 3, 1), Some(date(2026, 3, 2)), 10.0),
        other_unit,
    ]);

    let filters = month_filter(2026, Month::March).with_selected(Dimension::Unit, "Sul");
    let bundle = run(&handler, filters).await;

    assert_eq!(bundle.kpis.realized_count, 1);
    assert_eq!(bundle.kpis.realized_value, 50.0);
    assert_eq!(bundle.categories.len(), 1);
    assert_eq!(bundle.categories[0].value, 50.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cutoffs, backlog and floating liability
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_meta_carries_cutoffs() {
    let bundle = run(&handler(vec![]), month_filter(2026, Month::January)).await;

    assert_eq!(bundle.meta.current_cutoff, date(2026, 1, 31));
    assert_eq!(bundle.meta.previous_cutoff, date(2025, 12, 31));
    assert!(bundle.meta.has_previous_period);
}

#[tokio::test]
async fn test_backlog_ignores_period_and_partitions_by_age() {
    let handler = handler(vec![
        record("P1", date(2026, 3, 30), None, 1.0),
        record("P2", date(2026, 3, 20), None, 2.0),
        record("P3", date(2026, 3, 5), None, 4.0),
        record("P4", date(2025, 11, 1), None, 8.0),
        record("P5", date(2026, 4, 2), None, 16.0),
        record("P6", date(2026, 3, 1), Some(date(2026, 3, 3)), 32.0),
    ]);

    let bundle = run(&handler, month_filter(2026, Month::March)).await;

    assert_eq!(bundle.kpis.backlog_count, 4);
    assert_eq!(bundle.kpis.backlog_value, 15.0);
    let buckets: Vec<_> = bundle
        .backlog_aging
        .iter()
        .map(|row| (row.bucket, row.count))
        .collect();
    assert_eq!(
        buckets,
        vec![
            (AgingBucket::UpToWeek, 1),
            (AgingBucket::UpToFortnight, 1),
            (AgingBucket::UpToMonth, 1),
            (AgingBucket::OverMonth, 1),
        ]
    );
    assert_eq!(
        bundle.backlog_aging.iter().map(|row| row.value).sum::<f64>(),
        bundle.kpis.backlog_value
    );
}

#[tokio::test]
async fn test_floating_liability_and_its_trend() {
    let handler = handler(vec![
        record("P1", date(2026, 1, 10), None, 100.0),
        record("P2", date(2026, 2, 10), None, 100.0),
        record("P3", date(2026, 2, 11), Some(date(2026, 2, 20)), 50.0),
    ]);

    let bundle = run(&handler, month_filter(2026, Month::February)).await;

    assert_eq!(bundle.kpis.floating_liability, 200.0);
    assert_eq!(bundle.kpis.previous_floating_liability, 100.0);
    assert_eq!(bundle.trends.floating_liability, Some(100.0));
}

// ─────────────────────────────────────────────────────────────────────────────
// Trends and alerts
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_trends_against_previous_month() {
    let handler = handler(vec![
        record("P1", date(2026, 2, 1), Some(date(2026, 2, 5)), 100.0),
        record("P2", date(2026, 3, 1), Some(date(2026, 3, 5)), 100.0),
        record("P3", date(2026, 3, 2), Some(date(2026, 3, 6)), 100.0),
    ]);

    let bundle = run(&handler, month_filter(2026, Month::March)).await;

    assert_eq!(bundle.trends.confirmed_count, Some(100.0));
    assert_eq!(bundle.trends.realized_value, Some(100.0));
    assert_eq!(bundle.trends.average_ticket, Some(0.0));
    assert_eq!(bundle.trends.avg_days_to_completion, Some(0.0));

    let alerted: Vec<_> = bundle.alerts.iter().map(|alert| alert.metric).collect();
    assert!(alerted.contains(&KpiMetric::ConfirmedCount));
    assert!(!alerted.contains(&KpiMetric::AverageTicket));
    assert!(bundle
        .alerts
        .iter()
        .all(|alert| alert.direction == TrendDirection::Up));
}

#[tokio::test]
async fn test_zero_previous_value_yields_no_trend() {
    let handler = handler(vec![record(
        "P1",
        date(2026, 3, 1),
        Some(date(2026, 3, 5)),
        100.0,
    )]);

    let bundle = run(&handler, month_filter(2026, Month::March)).await;

    assert_eq!(bundle.trends.confirmed_count, None);
    assert_eq!(bundle.trends.realized_value, None);
}

#[tokio::test]
async fn test_several_years_have_no_previous_period() {
    let handler = handler(vec![
        record("P1", date(2025, 3, 1), Some(date(2025, 3, 5)), 100.0),
        record("P2", date(2026, 3, 1), Some(date(2026, 3, 5)), 100.0),
    ]);
    let filters = FilterState {
        years: BTreeSet::from([2025, 2026]),
        ..Default::default()
    };

    let bundle = run(&handler, filters).await;

    assert!(!bundle.meta.has_previous_period);
    assert_eq!(bundle.trends.confirmed_count, None);
    assert_eq!(bundle.trends.realized_count, None);
    assert_eq!(bundle.trends.average_ticket, None);
    assert_eq!(bundle.kpis.confirmed_count, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Series and comparison
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_daily_and_monthly_series() {
    let handler = handler(vec![
        record("P1", date(2026, 1, 1), Some(date(2026, 1, 5)), 10.0),
        record("P2", date(2026, 1, 1), Some(date(2026, 1, 5)), 20.0),
        record("P3", date(2026, 1, 1), Some(date(2026, 3, 2)), 40.0),
    ]);
    let filters = FilterState {
        years: BTreeSet::from([2026]),
        ..Default::default()
    };

    let bundle = run(&handler, filters).await;

    let days: Vec<_> = bundle
        .daily_realized
        .iter()
        .map(|point| (point.day, point.count))
        .collect();
    assert_eq!(days, vec![(2, 1), (5, 2)]);

    let months: Vec<_> = bundle
        .monthly_realized
        .iter()
        .map(|point| (point.month, point.value))
        .collect();
    assert_eq!(months, vec![(Month::January, 30.0), (Month::March, 40.0)]);
}

#[tokio::test]
async fn test_comparison_zips_days_of_both_periods() {
    let handler = handler(vec![
        record("P1", date(2024, 1, 10), Some(date(2024, 1, 31)), 70.0),
        record("P2", date(2023, 2, 1), Some(date(2023, 2, 28)), 30.0),
    ]);
    let filters = FilterState {
        compare_mode: true,
        compare_a: PeriodSelection::new(2024, Month::January),
        compare_b: PeriodSelection::new(2023, Month::February),
        ..Default::default()
    };

    let bundle = run(&handler, filters).await;
    let comparison = bundle.comparison.expect("comparison present");

    assert_eq!(comparison.label_a, "Janeiro 2024");
    assert_eq!(comparison.label_b, "Fevereiro 2023");
    assert_eq!(comparison.daily.len(), 31);
    assert_eq!(comparison.daily[30].value_a, 70.0);
    assert_eq!(comparison.daily[27].value_b, 30.0);
    assert_eq!(comparison.monthly[0].value, 70.0);
    assert_eq!(comparison.monthly[1].count, 1);

    // Period A drives the regular KPIs
    assert_eq!(bundle.kpis.realized_value, 70.0);
}

#[tokio::test]
async fn test_incomplete_comparison_has_no_series() {
    let filters = FilterState {
        compare_mode: true,
        compare_a: PeriodSelection::new(2024, Month::January),
        ..Default::default()
    };
    let bundle = run(&handler(vec![]), filters).await;
    assert!(bundle.comparison.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_group_aborts_run() {
    let relation = Arc::new(FailingGroups {
        inner: InMemoryProductionTable::new(vec![record(
            "P1",
            date(2026, 3, 1),
            None,
            1.0,
        )]),
    });
    let handler = ComputeDashboardHandler::new(
        relation.clone(),
        Arc::new(FixedClock(date(2026, 10, 15))),
    );

    let result = handler
        .handle(ComputeDashboardQuery {
            filters: month_filter(2026, Month::March),
        })
        .await;

    assert_eq!(
        result,
        Err(DashboardError::Connection("connection reset".to_string()))
    );
}

#[tokio::test]
async fn test_out_of_range_year_is_invalid_filter() {
    let result = handler(vec![])
        .handle(ComputeDashboardQuery {
            filters: month_filter(99_999, Month::March),
        })
        .await;

    assert!(matches!(result, Err(DashboardError::InvalidFilter(_))));
}
