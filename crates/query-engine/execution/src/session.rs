//! The unit of work.
//!
//! A [`Session`] owns one pooled connection for as long as the caller needs it. It keeps an
//! identity map of every entity it has returned, so that each entity is represented by one
//! snapshot, and a queue of keyed updates that are written on [`Session::flush`].
//!
//! Bulk mutations go straight to the database and leave the identity map alone: snapshots
//! loaded before an update keep their old values until the session is cleared.

use indexmap::IndexMap;
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use tracing::{info_span, Instrument};

use query_engine_sql::sql::execution_plan::{ExecutionPlan, Mutation, Query};
use querydsl_models as models;

use crate::error::Error;
use crate::metrics::Metrics;
use crate::{mutation, query};

/// An entity is identified by its entity name and key.
type Identity = (String, i64);

pub struct Session {
    connection: PoolConnection<Sqlite>,
    metrics: Metrics,
    identity_map: IndexMap<Identity, models::EntityRecord>,
    pending: Vec<ExecutionPlan<Mutation>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("managed", &self.identity_map.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(connection: PoolConnection<Sqlite>, metrics: Metrics) -> Session {
        Session {
            connection,
            metrics,
            identity_map: IndexMap::new(),
            pending: vec![],
        }
    }

    /// Run a query and return its rows. Pending writes are flushed first.
    ///
    /// Entities already managed by this session are returned as their managed snapshot,
    /// whatever the database holds now. Associations pointing at a managed entity are
    /// returned loaded.
    pub async fn fetch(
        &mut self,
        plan: &ExecutionPlan<Query>,
    ) -> Result<Vec<models::ResultRow>, Error> {
        self.flush().await?;

        let rows = query::execute(&mut self.connection, &self.metrics, plan)
            .instrument(info_span!("Fetch"))
            .await?;

        let mut managed_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let items = row.0.into_iter().map(|item| self.manage_item(item)).collect();
            managed_rows.push(models::ResultRow(items));
        }

        for row in &mut managed_rows {
            for item in &mut row.0 {
                if let models::ResultItem::Entity(Some(record)) = item {
                    self.resolve_associations(record);
                }
            }
        }

        Ok(managed_rows)
    }

    /// Explain a query. Returns the pretty printed SQL and the plan the database chose.
    pub async fn explain(
        &mut self,
        plan: &ExecutionPlan<Query>,
    ) -> Result<(String, String), Error> {
        query::explain(&mut self.connection, &self.metrics, plan).await
    }

    /// Run a bulk update or delete and return the number of rows it changed.
    pub async fn execute(&mut self, plan: &ExecutionPlan<Mutation>) -> Result<u64, Error> {
        self.flush().await?;
        mutation::execute(&mut self.connection, &self.metrics, plan).await
    }

    /// Insert a row and return the key the database generated for it. Pending writes are
    /// flushed first.
    pub async fn insert(&mut self, plan: &ExecutionPlan<Mutation>) -> Result<i64, Error> {
        self.flush().await?;
        mutation::insert(&mut self.connection, &self.metrics, plan).await
    }

    /// Manage a snapshot, replacing whatever was managed under its identity.
    pub fn attach(&mut self, record: models::EntityRecord) {
        tracing::debug!(entity = %record.entity, key = record.key, "attached");
        self.identity_map
            .insert((record.entity.clone(), record.key), record);
    }

    /// Replace the managed snapshot of an entity and queue the update that writes it.
    pub fn merge(&mut self, record: models::EntityRecord, plan: ExecutionPlan<Mutation>) {
        self.attach(record);
        self.pending.push(plan);
    }

    /// Write every queued update, in the order they were queued.
    pub async fn flush(&mut self) -> Result<(), Error> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        async {
            for plan in &pending {
                mutation::execute(&mut self.connection, &self.metrics, plan).await?;
            }
            Ok::<(), Error>(())
        }
        .instrument(info_span!("Flush", writes = pending.len()))
        .await
    }

    /// Forget every managed snapshot. Queued updates are kept.
    pub fn clear(&mut self) {
        self.identity_map.clear();
    }

    /// The managed snapshot of an entity, if this session has one.
    pub fn get(&self, entity: &str, key: i64) -> Option<&models::EntityRecord> {
        self.identity_map.get(&(entity.to_string(), key))
    }

    pub fn contains(&self, entity: &str, key: i64) -> bool {
        self.get(entity, key).is_some()
    }

    /// The number of managed entities.
    pub fn managed(&self) -> usize {
        self.identity_map.len()
    }

    /// The number of queued updates.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn manage_item(&mut self, item: models::ResultItem) -> models::ResultItem {
        match item {
            models::ResultItem::Entity(Some(record)) => {
                models::ResultItem::Entity(Some(self.manage(record)))
            }
            other => other,
        }
    }

    /// Register a freshly read record, or return the snapshot already managed under its
    /// identity. Loaded associations are registered too, and upgrade an unloaded association
    /// of the managed snapshot.
    fn manage(&mut self, mut record: models::EntityRecord) -> models::EntityRecord {
        let identity = (record.entity.clone(), record.key);
        if !self.identity_map.contains_key(&identity) {
            for association in record.associations.values_mut() {
                if let models::Association::Loaded(target) = association {
                    let managed = self.manage((**target).clone());
                    *target = Box::new(managed);
                }
            }
            self.identity_map.insert(identity, record.clone());
            return record;
        }

        for (name, association) in std::mem::take(&mut record.associations) {
            let models::Association::Loaded(target) = association else {
                continue;
            };
            let target = self.manage(*target);
            if let Some(managed) = self.identity_map.get_mut(&identity) {
                if let Some(state @ models::Association::Unloaded { .. }) =
                    managed.associations.get_mut(&name)
                {
                    *state = models::Association::Loaded(Box::new(target));
                }
            }
        }
        self.identity_map.get(&identity).cloned().unwrap_or(record)
    }

    /// Associations whose target is managed are returned loaded with that snapshot.
    fn resolve_associations(&self, record: &mut models::EntityRecord) {
        for association in record.associations.values_mut() {
            if let models::Association::Unloaded { entity, key } = association {
                if let Some(target) = self.get(entity, *key) {
                    *association = models::Association::Loaded(Box::new(target.clone()));
                }
            }
        }
    }
}
