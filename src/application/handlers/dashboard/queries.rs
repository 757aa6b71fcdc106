//! Record sets and aggregate groups issued by a dashboard run.
//!
//! Every helper only reads from the relation; independent aggregates within
//! a group are awaited concurrently.

use chrono::NaiveDate;

use crate::domain::dashboard::{AgingBucket, AgingRow, Breakdown, BreakdownRow, DailyPoint, MonthlyPoint, Totals};
use crate::domain::foundation::Month;
use crate::domain::period::{DateBasis, PeriodFilter};
use crate::domain::filtering::Predicate;
use crate::domain::production::{Column, Value, CONFIRMED_STATUS};
use crate::ports::{Direction, Expression, GroupQuery, GroupRow, Measure, OrderBy, RelationError, RelationProvider};

/// Days from confirmation to completion.
pub(super) const LEAD_TIME: Expression = Expression::DaysBetween {
    from: Column::ConfirmationDate,
    to: Column::CompletionDate,
};

// ─────────────────────────────────────────────────────────────────────────────
// Record sets
// ─────────────────────────────────────────────────────────────────────────────

/// Confirmed status plus the structural restriction; no temporal clause.
pub(super) fn confirmed_status(structural: &Predicate) -> Predicate {
    Predicate::all()
        .and_trimmed_equals(Column::Status, CONFIRMED_STATUS)
        .merge(structural)
}

/// Confirmed records whose confirmation date falls in `period`.
pub(super) fn confirmed_in(structural: &Predicate, period: &PeriodFilter) -> Predicate {
    confirmed_status(structural).merge(&period.predicate(DateBasis::Confirmation))
}

/// Completed records whose completion date falls in `period`.
pub(super) fn realized_in(structural: &Predicate, period: &PeriodFilter) -> Predicate {
    confirmed_status(structural)
        .and_not_null(Column::CompletionDate)
        .merge(&period.predicate(DateBasis::Completion))
}

/// Open records confirmed on or before the cutoff. Ignores the period filter.
pub(super) fn open_backlog(structural: &Predicate, cutoff: NaiveDate) -> Predicate {
    confirmed_status(structural)
        .and_null(Column::CompletionDate)
        .and_on_or_before(Column::ConfirmationDate, cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// Scalar groups
// ─────────────────────────────────────────────────────────────────────────────

pub(super) async fn totals(
    relation: &dyn RelationProvider,
    predicate: &Predicate,
) -> Result<Totals, RelationError> {
    let (count, value) = tokio::try_join!(
        relation.count(predicate),
        relation.sum(Column::Amount, predicate),
    )?;
    Ok(Totals::new(count, value))
}

/// Aggregates over a realized record set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct RealizedSummary {
    pub totals: Totals,
    pub distinct_companies: u64,
    pub distinct_patients: u64,
    pub avg_days: Option<f64>,
}

pub(super) async fn realized_summary(
    relation: &dyn RelationProvider,
    realized: &Predicate,
) -> Result<RealizedSummary, RelationError> {
    let (totals, distinct_companies, distinct_patients, avg_days) = tokio::try_join!(
        totals(relation, realized),
        relation.distinct_count(Column::CompanyId, realized),
        relation.distinct_count(Column::PatientId, realized),
        relation.avg(LEAD_TIME, realized),
    )?;
    Ok(RealizedSummary {
        totals,
        distinct_companies,
        distinct_patients,
        avg_days,
    })
}

/// Confirmed and realized aggregates of the period before the current one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PreviousSnapshot {
    pub confirmed: Totals,
    pub realized: RealizedSummary,
}

pub(super) async fn previous_snapshot(
    relation: &dyn RelationProvider,
    structural: &Predicate,
    period: Option<&PeriodFilter>,
) -> Result<Option<PreviousSnapshot>, RelationError> {
    let Some(period) = period else {
        return Ok(None);
    };
    let confirmed = confirmed_in(structural, period);
    let realized = realized_in(structural, period);
    let (confirmed, realized) = tokio::try_join!(
        totals(relation, &confirmed),
        realized_summary(relation, &realized),
    )?;
    Ok(Some(PreviousSnapshot {
        confirmed,
        realized,
    }))
}

/// Value confirmed up to the cutoff minus value completed up to the cutoff.
pub(super) async fn floating_liability(
    relation: &dyn RelationProvider,
    structural: &Predicate,
    cutoff: NaiveDate,
) -> Result<f64, RelationError> {
    let booked = confirmed_status(structural).and_on_or_before(Column::ConfirmationDate, cutoff);
    let delivered = confirmed_status(structural)
        .and_not_null(Column::CompletionDate)
        .and_on_or_before(Column::CompletionDate, cutoff);
    let (booked, delivered) = tokio::try_join!(
        relation.sum(Column::Amount, &booked),
        relation.sum(Column::Amount, &delivered),
    )?;
    Ok(booked - delivered)
}

pub(super) async fn backlog_aging(
    relation: &dyn RelationProvider,
    open: &Predicate,
    cutoff: NaiveDate,
) -> Result<Vec<AgingRow>, RelationError> {
    let [a, b, c, d] = AgingBucket::ALL.map(|bucket| open.clone().merge(&bucket.predicate(cutoff)));
    let totals = tokio::try_join!(
        totals(relation, &a),
        totals(relation, &b),
        totals(relation, &c),
        totals(relation, &d),
    )?;
    let totals = [totals.0, totals.1, totals.2, totals.3];

    Ok(AgingBucket::ALL
        .into_iter()
        .zip(totals)
        .map(|(bucket, totals)| AgingRow {
            bucket,
            count: totals.count,
            value: totals.value,
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Grouped series
// ─────────────────────────────────────────────────────────────────────────────

/// Every breakdown of the realized set.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Breakdowns {
    pub categories: Vec<BreakdownRow>,
    pub service_types: Vec<BreakdownRow>,
    pub attendance_types: Vec<BreakdownRow>,
    pub top_sub_areas: Vec<BreakdownRow>,
    pub lead_time_sub_areas: Vec<BreakdownRow>,
}

pub(super) async fn breakdowns(
    relation: &dyn RelationProvider,
    realized: &Predicate,
) -> Result<Breakdowns, RelationError> {
    let (categories, service_types, attendance_types, top_sub_areas, lead_time_sub_areas) = tokio::try_join!(
        breakdown(relation, realized, Breakdown::Category),
        breakdown(relation, realized, Breakdown::ServiceType),
        breakdown(relation, realized, Breakdown::AttendanceType),
        breakdown(relation, realized, Breakdown::TopSubAreas),
        breakdown(relation, realized, Breakdown::LeadTimeSubAreas),
    )?;
    Ok(Breakdowns {
        categories,
        service_types,
        attendance_types,
        top_sub_areas,
        lead_time_sub_areas,
    })
}

/// Count and value per key, largest count first, ties by key.
pub(super) async fn breakdown(
    relation: &dyn RelationProvider,
    realized: &Predicate,
    breakdown: Breakdown,
) -> Result<Vec<BreakdownRow>, RelationError> {
    let query = GroupQuery::new(realized.clone().merge(&breakdown.restriction()))
        .group(breakdown.column())
        .measure(Measure::Count)
        .measure(Measure::Sum(Column::Amount))
        .order(OrderBy::Measure(0, Direction::Desc))
        .order(OrderBy::Key(0, Direction::Asc))
        .limit(breakdown.limit());

    relation
        .group_by(&query)
        .await?
        .into_iter()
        .map(|row| {
            let key = row
                .key(0)
                .and_then(Value::as_text)
                .ok_or_else(|| unexpected_key(&row, "text"))?
                .to_string();
            Ok(BreakdownRow {
                key,
                count: row.count(0),
                value: row.sum(1),
            })
        })
        .collect()
}

/// Realized count and value per completion day, ascending.
pub(super) async fn daily_series(
    relation: &dyn RelationProvider,
    realized: &Predicate,
) -> Result<Vec<DailyPoint>, RelationError> {
    let query = GroupQuery::new(realized.clone())
        .group(Column::CompletionDay)
        .measure(Measure::Count)
        .measure(Measure::Sum(Column::Amount))
        .order(OrderBy::Key(0, Direction::Asc));

    relation
        .group_by(&query)
        .await?
        .into_iter()
        .map(|row| {
            let day = row
                .key(0)
                .and_then(Value::as_integer)
                .and_then(|day| u32::try_from(day).ok())
                .ok_or_else(|| unexpected_key(&row, "day of month"))?;
            Ok(DailyPoint {
                day,
                count: row.count(0),
                value: row.sum(1),
            })
        })
        .collect()
}

/// Realized count and value per completion month, calendar order.
pub(super) async fn monthly_series(
    relation: &dyn RelationProvider,
    realized: &Predicate,
) -> Result<Vec<MonthlyPoint>, RelationError> {
    let query = GroupQuery::new(realized.clone())
        .group(Column::CompletionMonthNumber)
        .measure(Measure::Count)
        .measure(Measure::Sum(Column::Amount))
        .order(OrderBy::Key(0, Direction::Asc));

    relation
        .group_by(&query)
        .await?
        .into_iter()
        .map(|row| {
            let month = row
                .key(0)
                .and_then(Value::as_integer)
                .and_then(|number| u32::try_from(number).ok())
                .and_then(|number| Month::from_number(number).ok())
                .ok_or_else(|| unexpected_key(&row, "month number"))?;
            Ok(MonthlyPoint {
                month,
                month_number: month.number(),
                count: row.count(0),
                value: row.sum(1),
            })
        })
        .collect()
}

/// Daily series and totals of one comparison side.
pub(super) async fn comparison_side(
    relation: &dyn RelationProvider,
    structural: &Predicate,
    (year, month): (i32, Month),
) -> Result<(Vec<DailyPoint>, Totals), RelationError> {
    let realized = realized_in(structural, &PeriodFilter::single(year, Some(month)));
    tokio::try_join!(daily_series(relation, &realized), totals(relation, &realized))
}

/// Both comparison sides, or nothing when comparison is off or incomplete.
pub(super) async fn comparison_sides(
    relation: &dyn RelationProvider,
    structural: &Predicate,
    periods: Option<((i32, Month), (i32, Month))>,
) -> Result<Option<ComparisonSides>, RelationError> {
    let Some((a, b)) = periods else {
        return Ok(None);
    };
    let (a, b) = tokio::try_join!(
        comparison_side(relation, structural, a),
        comparison_side(relation, structural, b),
    )?;
    Ok(Some(ComparisonSides { a, b }))
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct ComparisonSides {
    pub a: (Vec<DailyPoint>, Totals),
    pub b: (Vec<DailyPoint>, Totals),
}

fn unexpected_key(row: &GroupRow, expected: &str) -> RelationError {
    RelationError::decode(format!("expected {expected} key, got {:?}", row.keys))
}
