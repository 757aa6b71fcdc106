//! ComputeDashboardHandler - Query handler for one dashboard run.
//!
//! A run turns a filter selection into a complete [`DashboardBundle`]:
//! cutoffs are planned first, every independent aggregate group is then
//! awaited concurrently, and the bundle is assembled only when all of them
//! succeeded. Any failure aborts the whole run.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::domain::dashboard::{
    average_ticket, ratio_percent, trend_percent, BundleMeta, ComparisonSeries, DashboardBundle,
    HealthStatus, KpiSummary, TrendSet,
};
use crate::domain::filtering::FilterState;
use crate::domain::foundation::RunId;
use crate::domain::period::compute_cutoffs;
use crate::ports::{Clock, RelationProvider};

use super::queries::{
    backlog_aging, breakdowns, comparison_sides, confirmed_in, daily_series, floating_liability,
    monthly_series, open_backlog, previous_snapshot, realized_in, realized_summary, totals,
    PreviousSnapshot,
};
use super::DashboardError;

/// Query to compute the dashboard for a filter selection.
#[derive(Debug, Clone)]
pub struct ComputeDashboardQuery {
    pub filters: FilterState,
}

/// Result of a successful run.
pub type ComputeDashboardResult = DashboardBundle;

/// Handler for dashboard runs.
pub struct ComputeDashboardHandler {
    relation: Arc<dyn RelationProvider>,
    clock: Arc<dyn Clock>,
}

impl ComputeDashboardHandler {
    pub fn new(relation: Arc<dyn RelationProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { relation, clock }
    }

    pub async fn handle(
        &self,
        query: ComputeDashboardQuery,
    ) -> Result<ComputeDashboardResult, DashboardError> {
        let run_id = RunId::new();
        let span = tracing::info_span!("dashboard_run", run_id = %run_id);
        self.run(run_id, query.filters).instrument(span).await
    }

    async fn run(
        &self,
        run_id: RunId,
        filters: FilterState,
    ) -> Result<DashboardBundle, DashboardError> {
        let started = Instant::now();
        let plan = compute_cutoffs(&filters, self.clock.today())?;
        let current_cutoff = plan.current_cutoff();
        let previous_cutoff = plan.previous_cutoff();

        tracing::debug!(
            %current_cutoff,
            %previous_cutoff,
            has_previous_period = plan.previous_period.is_some(),
            "Planned dashboard run"
        );

        let structural = filters.structural_predicate();
        let confirmed = confirmed_in(&structural, &plan.current_period);
        let realized = realized_in(&structural, &plan.current_period);
        let open = open_backlog(&structural, current_cutoff);
        let relation = self.relation.as_ref();

        let result = tokio::try_join!(
            totals(relation, &confirmed),
            realized_summary(relation, &realized),
            totals(relation, &open),
            backlog_aging(relation, &open, current_cutoff),
            floating_liability(relation, &structural, current_cutoff),
            floating_liability(relation, &structural, previous_cutoff),
            breakdowns(relation, &realized),
            daily_series(relation, &realized),
            monthly_series(relation, &realized),
            previous_snapshot(relation, &structural, plan.previous_period.as_ref()),
            comparison_sides(relation, &structural, filters.comparison_periods()),
        );

        let (
            confirmed,
            realized,
            backlog,
            backlog_aging,
            floating,
            previous_floating,
            breakdowns,
            daily_realized,
            monthly_realized,
            previous,
            comparison,
        ) = match result {
            Ok(groups) => groups,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Dashboard run failed"
                );
                return Err(err.into());
            }
        };

        let kpis = KpiSummary {
            confirmed_count: confirmed.count,
            confirmed_value: confirmed.value,
            realized_count: realized.totals.count,
            realized_value: realized.totals.value,
            distinct_companies: realized.distinct_companies,
            distinct_patients: realized.distinct_patients,
            avg_days_to_completion: realized.avg_days,
            average_ticket: average_ticket(realized.totals.value, realized.totals.count),
            realization_rate_by_volume: ratio_percent(
                realized.totals.count as f64,
                confirmed.count as f64,
            ),
            realization_rate_by_value: ratio_percent(realized.totals.value, confirmed.value),
            backlog_count: backlog.count,
            backlog_value: backlog.value,
            floating_liability: floating,
            previous_floating_liability: previous_floating,
        };
        let trends = trend_set(&kpis, previous.as_ref());
        let health = HealthStatus::classify(kpis.realization_rate_by_volume, kpis.backlog_count);

        let comparison = comparison.map(|sides| {
            ComparisonSeries::new(
                filters.compare_label_a(),
                filters.compare_label_b(),
                &sides.a.0,
                &sides.b.0,
                sides.a.1,
                sides.b.1,
            )
        });

        let bundle = DashboardBundle {
            meta: BundleMeta {
                run_id,
                current_period: plan.current_period.clone(),
                current_cutoff,
                previous_cutoff,
                has_previous_period: plan.previous_period.is_some(),
                previous_period: plan.previous_period.clone(),
            },
            alerts: trends.alerts(),
            kpis,
            trends,
            health,
            backlog_aging,
            categories: breakdowns.categories,
            service_types: breakdowns.service_types,
            attendance_types: breakdowns.attendance_types,
            top_sub_areas: breakdowns.top_sub_areas,
            lead_time_sub_areas: breakdowns.lead_time_sub_areas,
            daily_realized,
            monthly_realized,
            comparison,
        };

        tracing::info!(
            confirmed = bundle.kpis.confirmed_count,
            realized = bundle.kpis.realized_count,
            backlog = bundle.kpis.backlog_count,
            health = bundle.health.label(),
            alerts = bundle.alerts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard run completed"
        );

        Ok(bundle)
    }
}

/// Trends against the previous period. Floating liability always has a
/// previous cutoff, so its trend is computed even without a previous period.
fn trend_set(kpis: &KpiSummary, previous: Option<&PreviousSnapshot>) -> TrendSet {
    let floating_liability =
        trend_percent(kpis.floating_liability, kpis.previous_floating_liability);

    let Some(previous) = previous else {
        return TrendSet {
            floating_liability,
            ..TrendSet::default()
        };
    };
    let prev_realized = previous.realized.totals;

    TrendSet {
        confirmed_count: trend_percent(
            kpis.confirmed_count as f64,
            previous.confirmed.count as f64,
        ),
        confirmed_value: trend_percent(kpis.confirmed_value, previous.confirmed.value),
        realized_count: trend_percent(kpis.realized_count as f64, prev_realized.count as f64),
        realized_value: trend_percent(kpis.realized_value, prev_realized.value),
        avg_days_to_completion: trend_percent(
            kpis.avg_days_to_completion.unwrap_or(0.0),
            previous.realized.avg_days.unwrap_or(0.0),
        ),
        average_ticket: trend_percent(
            kpis.average_ticket,
            average_ticket(prev_realized.value, prev_realized.count),
        ),
        floating_liability,
    }
}

#[cfg(test)]
#[path = "compute_dashboard_test.rs"]
mod compute_dashboard_test;
