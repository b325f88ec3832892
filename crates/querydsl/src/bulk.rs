//! Bulk updates and deletes.
//!
//! These run as a single statement against storage. Snapshots the session already manages
//! are not refreshed: after a bulk mutation, clear the session before reading the
//! affected entities again.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use query_engine_execution::Session;
use query_engine_metadata::metadata;
use query_engine_translation::translation::mutation;
use querydsl_models::{DeleteDescriptor, EntityPath, Expression, Path, UpdateDescriptor};

use crate::error::Error;

/// `UPDATE ... SET ... WHERE ...`
#[derive(Debug, Clone)]
pub struct UpdateClause {
    metadata: Arc<metadata::Metadata>,
    descriptor: UpdateDescriptor,
}

impl UpdateClause {
    pub(crate) fn new(metadata: Arc<metadata::Metadata>, target: &EntityPath) -> UpdateClause {
        UpdateClause {
            metadata,
            descriptor: UpdateDescriptor::new(target),
        }
    }

    /// Assign a value or an expression over the current row.
    #[must_use]
    pub fn set(mut self, attribute: &Path, value: impl Into<Expression>) -> Self {
        self.descriptor = self.descriptor.set(&attribute.expr(), value);
        self
    }

    #[must_use]
    pub fn set_null(mut self, attribute: &Path) -> Self {
        self.descriptor = self.descriptor.set_null(&attribute.expr());
        self
    }

    #[must_use]
    pub fn where_(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.descriptor = self.descriptor.where_(condition);
        self
    }

    /// Run the update and return the number of rows it changed.
    pub async fn execute(&self, session: &mut Session) -> Result<u64, Error> {
        let plan = async { mutation::translate_update(&self.metadata, &self.descriptor) }
            .instrument(info_span!("Plan update"))
            .await?;

        Ok(session
            .execute(&plan)
            .instrument(info_span!("Execute update"))
            .await?)
    }
}

/// `DELETE FROM ... WHERE ...`
#[derive(Debug, Clone)]
pub struct DeleteClause {
    metadata: Arc<metadata::Metadata>,
    descriptor: DeleteDescriptor,
}

impl DeleteClause {
    pub(crate) fn new(metadata: Arc<metadata::Metadata>, target: &EntityPath) -> DeleteClause {
        DeleteClause {
            metadata,
            descriptor: DeleteDescriptor::new(target),
        }
    }

    #[must_use]
    pub fn where_(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.descriptor = self.descriptor.where_(condition);
        self
    }

    /// Run the delete and return the number of rows it removed.
    pub async fn execute(&self, session: &mut Session) -> Result<u64, Error> {
        let plan = async { mutation::translate_delete(&self.metadata, &self.descriptor) }
            .instrument(info_span!("Plan delete"))
            .await?;

        Ok(session
            .execute(&plan)
            .instrument(info_span!("Execute delete"))
            .await?)
    }
}
