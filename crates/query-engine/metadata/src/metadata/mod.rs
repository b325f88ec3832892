//! Metadata information regarding the mapped entities and their tables.

pub mod database;

// re-export without modules
pub use database::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub tables: TablesInfo,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            tables: TablesInfo::empty(),
        }
    }

    /// Find the mapping of an entity by its name.
    pub fn lookup_table(&self, entity: &str) -> Option<&TableInfo> {
        self.tables.0.get(entity)
    }
}
