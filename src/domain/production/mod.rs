//! Production dataset vocabulary: records, derived rows and the column schema.

mod column;
mod record;

pub use column::{Column, ColumnKind, Value};
pub use record::{DateParts, ProductionRecord, ProductionRow, CONFIRMED_STATUS};
