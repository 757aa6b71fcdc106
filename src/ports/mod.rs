//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `RelationProvider` - Aggregate queries over the production relation
//! - `Clock` - Current date, injectable for tests

mod clock;
mod relation_provider;

pub use clock::Clock;
pub use relation_provider::{
    Direction, Expression, GroupQuery, GroupRow, Measure, MeasureValue, OrderBy,
    RelationError, RelationProvider,
};
pub(crate) use relation_provider::is_numeric;
