//! PostgreSQL adapters - Database implementation of the relation port.
//!
//! - `PostgresProductionRelation` - Aggregate queries over a production table
//! - `sql` - Predicate compilation to bound parameters

mod production_relation;
mod sql;

pub use production_relation::PostgresProductionRelation;
pub use sql::TableName;
