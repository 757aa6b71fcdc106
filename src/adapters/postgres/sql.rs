//! Predicate and query compilation to parameterized PostgreSQL.
//!
//! Column names come from [`Column::name`] and the table name is validated
//! once as a plain identifier; every value goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::filtering::{Clause, Predicate};
use crate::domain::production::{Column, ColumnKind, Value};
use crate::ports::{Direction, Expression, GroupQuery, Measure, OrderBy, RelationError};

pub(crate) type Sql = QueryBuilder<'static, Postgres>;

/// A validated, optionally schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self, RelationError> {
        let parts: Vec<&str> = name.split('.').collect();
        let valid = parts.len() <= 2 && parts.iter().all(|part| is_identifier(part));
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(RelationError::query(format!("invalid table name: {name:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub(crate) fn count(table: &TableName, predicate: &Predicate) -> Sql {
    let mut sql = Sql::new("SELECT COUNT(*)::BIGINT FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, predicate);
    sql
}

pub(crate) fn sum(table: &TableName, column: Column, predicate: &Predicate) -> Sql {
    let mut sql = Sql::new("SELECT COALESCE(SUM(");
    sql.push(column.name());
    sql.push("), 0)::FLOAT8 FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, predicate);
    sql
}

pub(crate) fn avg(table: &TableName, expression: Expression, predicate: &Predicate) -> Sql {
    let mut sql = Sql::new("SELECT AVG(");
    match expression {
        Expression::Column { column } => {
            sql.push(column.name());
        }
        Expression::DaysBetween { from, to } => {
            sql.push(format_args!("({} - {})", to.name(), from.name()));
        }
    }
    sql.push(")::FLOAT8 FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, predicate);
    sql
}

pub(crate) fn distinct_count(table: &TableName, column: Column, predicate: &Predicate) -> Sql {
    let mut sql = Sql::new("SELECT COUNT(DISTINCT ");
    sql.push(column.name());
    sql.push(")::BIGINT FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, predicate);
    sql
}

pub(crate) fn distinct_values(table: &TableName, column: Column, predicate: &Predicate) -> Sql {
    let predicate = predicate.clone().and_not_null(column);
    let mut sql = Sql::new("SELECT DISTINCT ");
    push_key(&mut sql, column, 0);
    sql.push(" FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, &predicate);
    sql.push(" ORDER BY k0 ASC");
    sql
}

/// `SELECT k0.., m0.. FROM t WHERE .. GROUP BY .. ORDER BY .. LIMIT ..`
///
/// Keys are aliased `k{i}`, measures `m{i}`.
pub(crate) fn group_by(table: &TableName, query: &GroupQuery) -> Sql {
    let mut sql = Sql::new("SELECT ");
    for (i, column) in query.group_by.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        push_key(&mut sql, *column, i);
    }
    for (i, measure) in query.measures.iter().enumerate() {
        match measure {
            Measure::Count => sql.push(format_args!(", COUNT(*)::BIGINT AS m{i}")),
            Measure::Sum(column) => sql.push(format_args!(
                ", COALESCE(SUM({}), 0)::FLOAT8 AS m{i}",
                column.name()
            )),
        };
    }
    sql.push(" FROM ");
    sql.push(table.as_str());
    push_where(&mut sql, &query.predicate);

    sql.push(" GROUP BY ");
    for i in 0..query.group_by.len() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push(format_args!("k{i}"));
    }

    // Requested ordering, then every key ascending with nulls first
    let mut terms: Vec<String> = query
        .order_by
        .iter()
        .map(|order| match order {
            OrderBy::Measure(i, direction) => format!("m{i} {}", keyword(*direction)),
            OrderBy::Key(i, direction) => format!("k{i} {} NULLS FIRST", keyword(*direction)),
        })
        .collect();
    terms.extend((0..query.group_by.len()).map(|i| format!("k{i} ASC NULLS FIRST")));
    sql.push(" ORDER BY ");
    sql.push(terms.join(", "));

    if let Some(limit) = query.limit {
        sql.push(" LIMIT ");
        sql.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    sql
}

fn keyword(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    }
}

/// Integer columns are widened so every key decodes as `BIGINT`.
fn push_key(sql: &mut Sql, column: Column, index: usize) {
    match column.kind() {
        ColumnKind::Integer => sql.push(format_args!("{}::BIGINT AS k{index}", column.name())),
        _ => sql.push(format_args!("{} AS k{index}", column.name())),
    };
}

pub(crate) fn push_where(sql: &mut Sql, predicate: &Predicate) {
    for (i, clause) in predicate.clauses().iter().enumerate() {
        sql.push(if i == 0 { " WHERE " } else { " AND " });
        push_clause(sql, clause);
    }
}

fn push_clause(sql: &mut Sql, clause: &Clause) {
    let column = clause.column().name();
    match clause {
        Clause::Equals { value, .. } => {
            sql.push(column).push(" = ");
            push_value(sql, value);
        }
        Clause::In { values, .. } => {
            sql.push(column).push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                push_value(sql, value);
            }
            sql.push(")");
        }
        Clause::TrimmedEquals { value, .. } => {
            sql.push(format_args!("TRIM({column}) = "));
            sql.push_bind(value.clone());
        }
        Clause::IsNull { .. } => {
            sql.push(column).push(" IS NULL");
        }
        Clause::IsNotNull { .. } => {
            sql.push(column).push(" IS NOT NULL");
        }
        Clause::NotBlank { .. } => {
            sql.push(format_args!("({column} IS NOT NULL AND {column} <> '')"));
        }
        Clause::OnOrBefore { date, .. } => {
            sql.push(column).push(" <= ");
            sql.push_bind(*date);
        }
        Clause::Between { from, to, .. } => {
            sql.push(column).push(" BETWEEN ");
            sql.push_bind(*from);
            sql.push(" AND ");
            sql.push_bind(*to);
        }
    }
}

fn push_value(sql: &mut Sql, value: &Value) {
    match value {
        Value::Null => {
            sql.push("NULL");
        }
        Value::Integer(i) => {
            sql.push_bind(*i);
        }
        Value::Text(text) => {
            sql.push_bind(text.clone());
        }
        Value::Date(date) => {
            sql.push_bind(*date);
        }
    }
}
