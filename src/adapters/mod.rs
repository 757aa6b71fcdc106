//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `in_memory` - Production relation held in memory, loaded from JSON
//! - `postgres` - Production relation in a PostgreSQL table
//! - `clock` - System and fixed clocks

pub mod clock;
pub mod in_memory;
pub mod postgres;

pub use clock::{FixedClock, SystemClock};
pub use in_memory::{DatasetLoadError, InMemoryProductionTable, JsonDatasetLoader};
pub use postgres::PostgresProductionRelation;
