//! PostgreSQL implementation of RelationProvider.
//!
//! Queries a table laid out like `migrations/0001_production_records.sql`,
//! whose derived temporal columns are generated by the database.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::sql::{self, TableName};
use crate::config::DatabaseConfig;
use crate::domain::filtering::Predicate;
use crate::domain::production::{Column, ColumnKind, Value};
use crate::ports::{
    Expression, GroupQuery, GroupRow, Measure, MeasureValue, RelationError, RelationProvider,
};

/// PostgreSQL-backed production relation.
#[derive(Clone)]
pub struct PostgresProductionRelation {
    pool: PgPool,
    table: TableName,
}

impl PostgresProductionRelation {
    /// Creates a relation over `table`, rejecting anything that is not a
    /// plain (optionally schema-qualified) identifier.
    pub fn new(pool: PgPool, table: &str) -> Result<Self, RelationError> {
        Ok(Self {
            pool,
            table: TableName::parse(table)?,
        })
    }

    /// Opens a pool sized from configuration.
    pub async fn connect(config: &DatabaseConfig, table: &str) -> Result<Self, RelationError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(&config.url)
            .await
            .map_err(|e| RelationError::connection(e.to_string()))?;
        Self::new(pool, table)
    }

    /// Applies the bundled migrations, which create `production_records`.
    pub async fn run_migrations(&self) -> Result<(), RelationError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RelationError::query(e.to_string()))
    }

    async fn fetch_i64(&self, mut query: sql::Sql) -> Result<i64, RelationError> {
        let row = query.build().fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn fetch_f64(&self, mut query: sql::Sql) -> Result<Option<f64>, RelationError> {
        let row = query.build().fetch_one(&self.pool).await?;
        Ok(row.try_get::<Option<f64>, _>(0)?)
    }
}

#[async_trait]
impl RelationProvider for PostgresProductionRelation {
    async fn count(&self, predicate: &Predicate) -> Result<u64, RelationError> {
        let count = self.fetch_i64(sql::count(&self.table, predicate)).await?;
        to_count(count)
    }

    async fn sum(&self, column: Column, predicate: &Predicate) -> Result<f64, RelationError> {
        require_numeric(column)?;
        let sum = self.fetch_f64(sql::sum(&self.table, column, predicate)).await?;
        Ok(sum.unwrap_or(0.0))
    }

    async fn avg(
        &self,
        expression: Expression,
        predicate: &Predicate,
    ) -> Result<Option<f64>, RelationError> {
        match expression {
            Expression::Column { column } => require_numeric(column)?,
            Expression::DaysBetween { from, to } => {
                if from.kind() != ColumnKind::Date || to.kind() != ColumnKind::Date {
                    return Err(RelationError::query("days between needs two date columns"));
                }
            }
        }
        self.fetch_f64(sql::avg(&self.table, expression, predicate))
            .await
    }

    async fn distinct_count(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<u64, RelationError> {
        let count = self
            .fetch_i64(sql::distinct_count(&self.table, column, predicate))
            .await?;
        to_count(count)
    }

    async fn group_by(&self, query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError> {
        query.validate()?;
        let rows = sql::group_by(&self.table, query)
            .build()
            .fetch_all(&self.pool)
            .await?;

        let key_count = query.group_by.len();
        rows.iter()
            .map(|row| {
                let keys = query
                    .group_by
                    .iter()
                    .enumerate()
                    .map(|(i, column)| decode_value(row, i, *column))
                    .collect::<Result<Vec<_>, _>>()?;
                let measures = query
                    .measures
                    .iter()
                    .enumerate()
                    .map(|(i, measure)| decode_measure(row, key_count + i, measure))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GroupRow { keys, measures })
            })
            .collect()
    }

    async fn distinct_values(
        &self,
        column: Column,
        predicate: &Predicate,
    ) -> Result<Vec<Value>, RelationError> {
        let rows = sql::distinct_values(&self.table, column, predicate)
            .build()
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| decode_value(row, 0, column)).collect()
    }
}

fn require_numeric(column: Column) -> Result<(), RelationError> {
    if crate::ports::is_numeric(column) {
        Ok(())
    } else {
        Err(RelationError::query(format!(
            "column {} is not numeric",
            column.name()
        )))
    }
}

fn to_count(value: i64) -> Result<u64, RelationError> {
    u64::try_from(value).map_err(|_| RelationError::decode(format!("negative count {value}")))
}

fn decode_value(row: &PgRow, index: usize, column: Column) -> Result<Value, RelationError> {
    let value: Value = match column.kind() {
        ColumnKind::Text => row.try_get::<Option<String>, _>(index)?.into(),
        ColumnKind::Integer => row.try_get::<Option<i64>, _>(index)?.into(),
        ColumnKind::Date => row.try_get::<Option<NaiveDate>, _>(index)?.into(),
        ColumnKind::Decimal => {
            return Err(RelationError::decode(format!(
                "decimal column {} cannot be a key",
                column.name()
            )))
        }
    };
    Ok(value)
}

fn decode_measure(
    row: &PgRow,
    index: usize,
    measure: &Measure,
) -> Result<MeasureValue, RelationError> {
    match measure {
        Measure::Count => Ok(MeasureValue::Count(to_count(row.try_get::<i64, _>(index)?)?)),
        Measure::Sum(_) => Ok(MeasureValue::Sum(row.try_get::<f64, _>(index)?)),
    }
}
