//! RelationProvider port - Set-based queries over the production relation.
//!
//! The dashboard pipeline never sees rows. It asks for counts, sums,
//! averages, distinct counts, grouped aggregates and distinct values, each
//! restricted by a [`Predicate`]. Any backend able to evaluate the predicate
//! algebra can serve the pipeline.
//!
//! ## Determinism
//!
//! Grouped results must be fully ordered. Implementations apply the
//! requested ordering first and then every group key ascending, so ties
//! always resolve the same way for the same data.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::filtering::Predicate;
use crate::domain::production::{Column, ColumnKind, Value};

/// Scalar expression an average can be taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// Numeric column as stored.
    Column { column: Column },

    /// Whole days from `from` to `to` (both date columns). Rows where
    /// either side is null are skipped.
    DaysBetween { from: Column, to: Column },
}

/// Aggregate computed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    Count,
    Sum(Column),
}

/// Result of one [`Measure`] for one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Count(u64),
    Sum(f64),
}

impl MeasureValue {
    pub fn as_count(&self) -> u64 {
        match self {
            MeasureValue::Count(count) => *count,
            MeasureValue::Sum(_) => 0,
        }
    }

    pub fn as_sum(&self) -> f64 {
        match self {
            MeasureValue::Sum(sum) => *sum,
            MeasureValue::Count(count) => *count as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// What to order grouped rows by. Indices refer to the query's measures or
/// grouping columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderBy {
    Measure(usize, Direction),
    Key(usize, Direction),
}

/// A grouped aggregate query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupQuery {
    pub group_by: Vec<Column>,
    pub measures: Vec<Measure>,
    pub predicate: Predicate,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl GroupQuery {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            group_by: Vec::new(),
            measures: Vec::new(),
            predicate,
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn group(mut self, column: Column) -> Self {
        self.group_by.push(column);
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Rejects queries no backend could answer meaningfully.
    pub fn validate(&self) -> Result<(), RelationError> {
        if self.group_by.is_empty() {
            return Err(RelationError::query("group query without grouping columns"));
        }
        for measure in &self.measures {
            if let Measure::Sum(column) = measure {
                if !is_numeric(*column) {
                    return Err(RelationError::query(format!(
                        "cannot sum non-numeric column {}",
                        column.name()
                    )));
                }
            }
        }
        for order in &self.order_by {
            let in_range = match order {
                OrderBy::Measure(index, _) => *index < self.measures.len(),
                OrderBy::Key(index, _) => *index < self.group_by.len(),
            };
            if !in_range {
                return Err(RelationError::query(format!(
                    "order index out of range: {order:?}"
                )));
            }
        }
        Ok(())
    }
}

/// One row of a grouped result: key values then measure values, both in the
/// order they were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<Value>,
    pub measures: Vec<MeasureValue>,
}

impl GroupRow {
    pub fn key(&self, index: usize) -> Option<&Value> {
        self.keys.get(index)
    }

    pub fn count(&self, index: usize) -> u64 {
        self.measures.get(index).map_or(0, MeasureValue::as_count)
    }

    pub fn sum(&self, index: usize) -> f64 {
        self.measures.get(index).map_or(0.0, MeasureValue::as_sum)
    }
}

pub(crate) fn is_numeric(column: Column) -> bool {
    matches!(column.kind(), ColumnKind::Integer | ColumnKind::Decimal)
}

/// Query contract consumed by the dashboard pipeline.
#[async_trait]
pub trait RelationProvider: Send + Sync {
    /// Number of rows matching the predicate.
    async fn count(&self, predicate: &Predicate) -> Result<u64, RelationError>;

    /// Sum of a numeric column over matching rows; 0 when nothing matches.
    async fn sum(&self, column: Column, predicate: &Predicate) -> Result<f64, RelationError>;

    /// Mean of the expression over matching rows; `None` when nothing matches.
    async fn avg(
        &self,
        expression: Expression,
        predicate: &Predicate,
    ) -> Result<Option<f64>, RelationError>;

    /// Number of distinct non-null values of a column over matching rows.
    async fn distinct_count(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<u64, RelationError>;

    /// Grouped aggregates, ordered as requested with keys as tie-break.
    async fn group_by(&self, query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError>;

    /// Distinct non-null values of a column over matching rows, ascending.
    async fn distinct_values(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, RelationError>;
}

/// Errors raised by relation backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    #[error("relation unreachable: {0}")]
    Connection(String),

    #[error("invalid query: {0}")]
    Query(String),

    #[error("unexpected result shape: {0}")]
    Decode(String),
}

impl RelationError {
    pub fn connection(message: impl Into<String>) -> Self {
        RelationError::Connection(message.into())
    }

    pub fn query(message: impl Into<String>) -> Self {
        RelationError::Query(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        RelationError::Decode(message.into())
    }
}

impl From<sqlx::Error> for RelationError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RelationError::Connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => RelationError::Decode(err.to_string()),
            _ => RelationError::Query(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────
    // Mock Implementation
    // ─────────────────────────────────────────────────────────────────────

    struct UnreachableRelation;

    #[async_trait]
    impl RelationProvider for UnreachableRelation {
        async fn count(&self, _predicate: &Predicate) -> Result<u64, RelationError> {
            Err(RelationError::connection("down"))
        }

        async fn sum(&self, _column: Column, _predicate: &Predicate) -> Result<f64, RelationError> {
            Err(RelationError::connection("down"))
        }

        async fn avg(
            &self,
            _expression: Expression,
            _predicate: &Predicate,
        ) -> Result<Option<f64>, RelationError> {
            Err(RelationError::connection("down"))
        }

        async fn distinct_count(
            &self,
            _column: Column,
            _predicate: &Predicate,
        ) -> Result<u64, RelationError> {
            Err(RelationError::connection("down"))
        }

        async fn group_by(&self, _query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError> {
            Err(RelationError::connection("down"))
        }

        async fn distinct_values(
            &self,
            _column: Column,
            _predicate: &Predicate,
        ) -> Result<Vec<Value>, RelationError> {
            Err(RelationError::connection("down"))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_provider_is_object_safe() {
        let relation: Box<dyn RelationProvider> = Box::new(UnreachableRelation);
        let result = relation.count(&Predicate::all()).await;
        assert!(matches!(result, Err(RelationError::Connection(_))));
    }

    #[test]
    fn test_group_query_requires_grouping_column() {
        let query = GroupQuery::new(Predicate::all()).measure(Measure::Count);
        assert!(matches!(query.validate(), Err(RelationError::Query(_))));
    }

    #[test]
    fn test_group_query_rejects_text_sum() {
        let query = GroupQuery::new(Predicate::all())
            .group(Column::Category)
            .measure(Measure::Sum(Column::Unit));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_group_query_rejects_out_of_range_order() {
        let query = GroupQuery::new(Predicate::all())
            .group(Column::Category)
            .measure(Measure::Count)
            .order(OrderBy::Measure(1, Direction::Desc));
        assert!(query.validate().is_err());

        let query = GroupQuery::new(Predicate::all())
            .group(Column::Category)
            .order(OrderBy::Key(1, Direction::Asc));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_valid_group_query_passes() {
        let query = GroupQuery::new(Predicate::all())
            .group(Column::CompletionDay)
            .measure(Measure::Count)
            .measure(Measure::Sum(Column::Amount))
            .order(OrderBy::Key(0, Direction::Asc))
            .limit(Some(10));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_group_row_accessors_default_missing_measures() {
        let row = GroupRow {
            keys: vec![Value::text("Exame")],
            measures: vec![MeasureValue::Count(3), MeasureValue::Sum(120.5)],
        };
        assert_eq!(row.key(0), Some(&Value::text("Exame")));
        assert_eq!(row.count(0), 3);
        assert_eq!(row.sum(1), 120.5);
        assert_eq!(row.count(7), 0);
    }

    #[test]
    fn test_error_conversion_from_sqlx() {
        let err: RelationError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RelationError::Connection(_)));

        let err: RelationError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, RelationError::Query(_)));

        let err: RelationError = sqlx::Error::ColumnNotFound("total".to_string()).into();
        assert!(matches!(err, RelationError::Decode(_)));
    }
}
