//! Errors surfaced by terminal operations.

use query_engine_execution::error as execution;
use query_engine_translation::translation::error as translation;
use querydsl_models::ConversionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected at most one row, found {0}")]
    NonUniqueResult(usize),
    #[error("cannot project onto {target}: it expects {expected} but the query selects {found}")]
    ProjectionArity {
        target: &'static str,
        expected: String,
        found: String,
    },
    #[error("cannot read '{column}': {error}")]
    Projection {
        column: String,
        error: ConversionError,
    },
    #[error("entity {entity} has no key; persist it first")]
    Transient { entity: &'static str },
    #[error("translation error: {0}")]
    Translation(#[from] translation::Error),
    #[error("storage error: {0}")]
    Storage(#[from] execution::Error),
}

impl Error {
    pub(crate) fn projection(column: impl Into<String>, error: ConversionError) -> Error {
        Error::Projection {
            column: column.into(),
            error,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Error::Storage(execution::Error::DB(error))
    }
}
