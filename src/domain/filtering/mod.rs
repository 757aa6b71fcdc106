//! Filtering - filter selections, cascading repair and the typed predicate
//! algebra shared by every relation backend.

mod cascade;
mod filter_state;
mod predicate;

pub use cascade::{repair, retain_valid, DependentOptions, FilterOptions};
pub use filter_state::{Dimension, FilterState, PeriodSelection};
pub use predicate::{Clause, Predicate};
