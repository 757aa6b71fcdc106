//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the production analytics domain.

mod errors;
mod ids;
mod month;

pub use errors::ValidationError;
pub use ids::RunId;
pub use month::Month;
