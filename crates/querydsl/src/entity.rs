//! Mapping between Rust types and managed entity records.

use querydsl_models::{Association, EntityRecord, FromValue, Value};
use query_engine_execution::Session;

use crate::error::Error;
use crate::factory::QueryFactory;

/// A Rust type mapped onto a catalog entity.
///
/// Attributes are exchanged by name. Associations are written as the key of their target,
/// which the catalog maps onto the foreign key column.
pub trait Entity: Sized {
    /// The name of the entity in the catalog.
    const ENTITY: &'static str;

    /// The generated key, once the entity has been persisted.
    fn key(&self) -> Option<i64>;

    fn set_key(&mut self, key: i64);

    fn from_record(record: &EntityRecord) -> Result<Self, Error>;

    /// Every attribute except the key.
    fn values(&self) -> Vec<(String, Value)>;
}

/// Read one attribute of a record. A missing attribute reads as null.
pub fn attribute<T: FromValue>(record: &EntityRecord, name: &str) -> Result<T, Error> {
    let value = record.attribute(name).cloned().unwrap_or_default();
    T::from_value(value)
        .map_err(|error| Error::projection(format!("{}.{name}", record.entity), error))
}

/// A to-one association that is either absent, known only by the key of its target, or
/// loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Lazy<T> {
    Absent,
    Unloaded(i64),
    Loaded(Box<T>),
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Lazy::Absent
    }
}

impl<T> Lazy<T> {
    pub fn of(target: T) -> Lazy<T> {
        Lazy::Loaded(Box::new(target))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Lazy::Loaded(_))
    }

    /// The loaded target, without touching the database.
    pub fn get(&self) -> Option<&T> {
        match self {
            Lazy::Loaded(target) => Some(target),
            Lazy::Absent | Lazy::Unloaded(_) => None,
        }
    }
}

impl<T: Entity> Lazy<T> {
    /// Read the association `name` of a record.
    pub fn from_record(record: &EntityRecord, name: &str) -> Result<Lazy<T>, Error> {
        Ok(match record.association(name) {
            None | Some(Association::Absent) => Lazy::Absent,
            Some(Association::Unloaded { key, .. }) => Lazy::Unloaded(*key),
            Some(Association::Loaded(target)) => Lazy::of(T::from_record(target)?),
        })
    }

    pub fn key(&self) -> Option<i64> {
        match self {
            Lazy::Absent => None,
            Lazy::Unloaded(key) => Some(*key),
            Lazy::Loaded(target) => target.key(),
        }
    }

    /// Load the target if it is not loaded yet. The session is asked first; otherwise the
    /// target is read by key.
    pub async fn load(
        &mut self,
        factory: &QueryFactory,
        session: &mut Session,
    ) -> Result<Option<&T>, Error> {
        if let Lazy::Unloaded(key) = *self {
            if let Some(target) = factory.find::<T>(session, key).await? {
                *self = Lazy::of(target);
            }
        }
        Ok(self.get())
    }
}
