//! Errors surfaced by the dashboard handlers.

use crate::domain::foundation::ValidationError;
use crate::ports::RelationError;

/// Errors that can occur while resolving filters or computing a bundle.
///
/// A failed run never yields a bundle; callers keep whatever they last
/// published.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error("Relation unreachable: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] ValidationError),
}

impl From<RelationError> for DashboardError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::Connection(msg) => DashboardError::Connection(msg),
            RelationError::Query(msg) => DashboardError::Query(msg),
            RelationError::Decode(msg) => DashboardError::Query(format!("decode: {msg}")),
        }
    }
}
