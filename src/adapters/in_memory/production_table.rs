//! In-Memory Production Table Adapter
//!
//! Evaluates predicates directly against rows held in memory. The rows are
//! immutable once loaded and shared behind an `Arc`, so any number of
//! concurrent runs can query the same table without coordination.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::filtering::Predicate;
use crate::domain::production::{Column, ProductionRecord, ProductionRow, Value};
use crate::ports::{
    is_numeric, Direction, Expression, GroupQuery, GroupRow, Measure, MeasureValue, OrderBy,
    RelationError, RelationProvider,
};

/// Production relation backed by a vector of rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductionTable {
    rows: Arc<Vec<ProductionRow>>,
}

impl InMemoryProductionTable {
    pub fn new(records: impl IntoIterator<Item = ProductionRecord>) -> Self {
        Self {
            rows: Arc::new(records.into_iter().map(ProductionRow::new).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a ProductionRow> {
        self.rows.iter().filter(move |row| predicate.matches(row))
    }
}

#[async_trait]
impl RelationProvider for InMemoryProductionTable {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RelationError> {
        Ok(self.matching(predicate).count() as u64)
    }

    async fn sum(&self, column: Column, predicate: &Predicate) -> Result<f64, RelationError> {
        require_numeric(column)?;
        Ok(self
            .matching(predicate)
            .filter_map(|row| row.numeric(column))
            .sum())
    }

    async fn avg(
        &self,
        expression: Expression,
        predicate: &Predicate,
    ) -> Result<Option<f64>, RelationError> {
        let values: Vec<f64> = match expression {
            Expression::Column { column } => {
                require_numeric(column)?;
                self.matching(predicate)
                    .filter_map(|row| row.numeric(column))
                    .collect()
            }
            Expression::DaysBetween { from, to } => self
                .matching(predicate)
                .filter_map(|row| {
                    let from = row.value(from).as_date()?;
                    let to = row.value(to).as_date()?;
                    Some((to - from).num_days() as f64)
                })
                .collect(),
        };
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn distinct_count(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<u64, RelationError> {
        Ok(self.distinct(column, predicate)?.len() as u64)
    }

    async fn group_by(&self, query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError> {
        query.validate()?;

        let mut groups: BTreeMap<Vec<Value>, Vec<MeasureValue>> = BTreeMap::new();
        for row in self.matching(&query.predicate) {
            let keys: Vec<Value> = query.group_by.iter().map(|c| row.value(*c)).collect();
            let accumulators = groups.entry(keys).or_insert_with(|| {
                query
                    .measures
                    .iter()
                    .map(|measure| match measure {
                        Measure::Count => MeasureValue::Count(0),
                        Measure::Sum(_) => MeasureValue::Sum(0.0),
                    })
                    .collect()
            });
            for (acc, measure) in accumulators.iter_mut().zip(&query.measures) {
                match (acc, measure) {
                    (MeasureValue::Count(count), Measure::Count) => *count += 1,
                    (MeasureValue::Sum(sum), Measure::Sum(column)) => {
                        *sum += row.numeric(*column).unwrap_or(0.0)
                    }
                    _ => {}
                }
            }
        }

        let mut rows: Vec<GroupRow> = groups
            .into_iter()
            .map(|(keys, measures)| GroupRow { keys, measures })
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, &query.order_by));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn distinct_values(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, RelationError> {
        Ok(self.distinct(column, predicate)?.into_iter().collect())
    }
}

impl InMemoryProductionTable {
    fn distinct(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<BTreeSet<Value>, RelationError> {
        if column == Column::Amount {
            return Err(RelationError::query("amount has no distinct values"));
        }
        Ok(self
            .matching(predicate)
            .map(|row| row.value(column))
            .filter(|value| !value.is_null())
            .collect())
    }
}

fn require_numeric(column: Column) -> Result<(), RelationError> {
    if is_numeric(column) {
        Ok(())
    } else {
        Err(RelationError::query(format!(
            "column {} is not numeric",
            column.name()
        )))
    }
}

/// Requested ordering first, then every key ascending.
fn compare_rows(a: &GroupRow, b: &GroupRow, order_by: &[OrderBy]) -> Ordering {
    order_by
        .iter()
        .map(|order| match order {
            OrderBy::Measure(i, direction) => {
                directed(compare_measures(&a.measures[*i], &b.measures[*i]), *direction)
            }
            OrderBy::Key(i, direction) => directed(a.keys[*i].cmp(&b.keys[*i]), *direction),
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.keys.cmp(&b.keys))
}

fn compare_measures(a: &MeasureValue, b: &MeasureValue) -> Ordering {
    match (a, b) {
        (MeasureValue::Count(a), MeasureValue::Count(b)) => a.cmp(b),
        _ => a.as_sum().total_cmp(&b.as_sum()),
    }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}
