//! Errors for query execution.

use query_engine_metadata::metadata::ScalarType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("database error: {0}")]
    DB(#[from] sqlx::Error),
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Errors in the shape of a result, as opposed to errors reported by the database.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("column '{column}' holds a value of type {found}, expected {expected}")]
    UnexpectedType {
        column: String,
        expected: ScalarType,
        found: String,
    },
    #[error("expected a mutation of kind {0}")]
    UnexpectedMutation(&'static str),
}
