//! Entry point for building queries, bulk mutations and entity writes.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{info_span, Instrument};

use query_engine_execution::Session;
use query_engine_metadata::metadata;
use query_engine_translation::translation::error::Error as TranslationError;
use query_engine_translation::translation::mutation;
use querydsl_models::{
    Association, EntityPath, EntityRecord, InsertDescriptor, KeyedUpdateDescriptor, Value,
};

use crate::bulk::{DeleteClause, UpdateClause};
use crate::entity::Entity;
use crate::error::Error;
use crate::projection::{EntityProjection, Projection, Projections};
use crate::query::Query;

/// Creates queries and clauses over one mapping catalog.
#[derive(Debug, Clone)]
pub struct QueryFactory {
    metadata: Arc<metadata::Metadata>,
}

impl QueryFactory {
    pub fn new(metadata: metadata::Metadata) -> QueryFactory {
        QueryFactory {
            metadata: Arc::new(metadata),
        }
    }

    pub fn metadata(&self) -> &metadata::Metadata {
        &self.metadata
    }

    /// Start a query with a projection.
    pub fn select<P: Projection>(&self, projection: P) -> Query<P> {
        Query::new(Arc::clone(&self.metadata), projection)
    }

    /// Select an entity from itself.
    pub fn select_from<E: Entity>(&self, path: &EntityPath) -> Query<EntityProjection<E>> {
        self.select(Projections::entity::<E>(path)).from(path)
    }

    pub fn update(&self, target: &EntityPath) -> UpdateClause {
        UpdateClause::new(Arc::clone(&self.metadata), target)
    }

    pub fn delete(&self, target: &EntityPath) -> DeleteClause {
        DeleteClause::new(Arc::clone(&self.metadata), target)
    }

    /// Find an entity by key. A snapshot managed by the session is returned without
    /// querying.
    pub async fn find<E: Entity>(
        &self,
        session: &mut Session,
        key: i64,
    ) -> Result<Option<E>, Error> {
        if let Some(record) = session.get(E::ENTITY, key) {
            return E::from_record(record).map(Some);
        }

        let info = self.table(E::ENTITY)?;
        let path = EntityPath::new(E::ENTITY, E::ENTITY.to_lowercase());
        self.select_from::<E>(&path)
            .where_(path.get(info.key.clone()).expr().eq(key))
            .fetch_one(session)
            .await
    }

    /// Insert a new entity. Its key is set to the one the database generated and its
    /// snapshot is managed by the session.
    pub async fn persist<E: Entity>(
        &self,
        session: &mut Session,
        entity: &mut E,
    ) -> Result<i64, Error> {
        let values = entity.values();
        let plan = async {
            mutation::translate_insert(
                &self.metadata,
                &InsertDescriptor {
                    entity: E::ENTITY.to_string(),
                    values: values.clone(),
                },
            )
        }
        .instrument(info_span!("Plan insert"))
        .await?;

        let key = session
            .insert(&plan)
            .instrument(info_span!("Execute insert"))
            .await?;

        entity.set_key(key);
        session.attach(self.snapshot(E::ENTITY, key, values)?);
        Ok(key)
    }

    /// Update the managed snapshot of an entity and queue the write until the session
    /// flushes.
    pub fn merge<E: Entity>(&self, session: &mut Session, entity: &E) -> Result<(), Error> {
        let key = entity.key().ok_or(Error::Transient { entity: E::ENTITY })?;
        let values = entity.values();
        let plan = mutation::translate_keyed_update(
            &self.metadata,
            &KeyedUpdateDescriptor {
                entity: E::ENTITY.to_string(),
                key,
                values: values.clone(),
            },
        )?;
        session.merge(self.snapshot(E::ENTITY, key, values)?, plan);
        Ok(())
    }

    fn table(&self, entity: &str) -> Result<&metadata::TableInfo, Error> {
        self.metadata
            .lookup_table(entity)
            .ok_or_else(|| TranslationError::EntityNotFound(entity.to_string()).into())
    }

    /// The record the session manages for an entity written with `values`.
    fn snapshot(
        &self,
        entity: &str,
        key: i64,
        values: Vec<(String, Value)>,
    ) -> Result<EntityRecord, Error> {
        let info = self.table(entity)?;

        let mut attributes = IndexMap::new();
        let mut associations = IndexMap::new();
        attributes.insert(info.key.clone(), Value::Integer(key));
        for (attribute, value) in values {
            if let Some(association) = info.lookup_association(&attribute) {
                let state = match value.as_i64() {
                    Some(target) => Association::Unloaded {
                        entity: association.target_entity.clone(),
                        key: target,
                    },
                    None => Association::Absent,
                };
                associations.insert(attribute, state);
            } else {
                attributes.insert(attribute, value);
            }
        }

        Ok(EntityRecord {
            entity: entity.to_string(),
            key,
            attributes,
            associations,
        })
    }
}
