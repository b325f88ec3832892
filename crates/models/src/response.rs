//! What a query returns.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A snapshot of one entity row, keyed by attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity: String,
    pub key: i64,
    pub attributes: IndexMap<String, Value>,
    pub associations: IndexMap<String, Association>,
}

impl EntityRecord {
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }
}

/// The state of a to-one association of an entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Association {
    /// The foreign key is null.
    Absent,
    /// Only the key is known; the target has not been loaded.
    Unloaded { entity: String, key: i64 },
    /// The target was loaded with its owner.
    Loaded(Box<EntityRecord>),
}

impl Association {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Association::Loaded(_))
    }

    pub fn key(&self) -> Option<i64> {
        match self {
            Association::Absent => None,
            Association::Unloaded { key, .. } => Some(*key),
            Association::Loaded(record) => Some(record.key),
        }
    }
}

/// One item of a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultItem {
    Scalar(Value),
    /// `None` when the entity came from an outer join that did not match.
    Entity(Option<EntityRecord>),
}

/// One row, with one item per select list entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultRow(pub Vec<ResultItem>);
