//! Metadata information regarding the database and the entities mapped onto it.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types an attribute can have.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Integer,
    Real,
    Text,
}

impl ScalarType {
    /// The column type used when creating a table for this scalar type.
    pub fn sql_type_name(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Integer => "INTEGER",
            ScalarType::Real => "REAL",
            ScalarType::Text => "TEXT",
        }
    }

    /// Map a declared or runtime column type back to a scalar type. Unknown names are
    /// treated as text.
    pub fn from_sql_type_name(name: &str) -> ScalarType {
        match name.to_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => ScalarType::Boolean,
            "INTEGER" | "INT" | "BIGINT" | "INT8" => ScalarType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => ScalarType::Real,
            _ => ScalarType::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Real)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Real => "real",
            ScalarType::Text => "text",
        };
        write!(f, "{name}")
    }
}

/// Mapping from an entity name to its table information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TablesInfo(pub BTreeMap<String, TableInfo>);

impl TablesInfo {
    pub fn empty() -> Self {
        TablesInfo(BTreeMap::new())
    }
}

/// Information about the table an entity is mapped onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub table_name: String,
    /// The attribute holding the generated integer key. Must be one of `columns`.
    pub key: String,
    /// Scalar attributes by attribute name, including the key.
    pub columns: BTreeMap<String, ColumnInfo>,
    /// To-one associations by attribute name.
    #[serde(default)]
    pub associations: BTreeMap<String, AssociationInfo>,
}

impl TableInfo {
    pub fn lookup_column(&self, attribute: &str) -> Option<&ColumnInfo> {
        self.columns.get(attribute)
    }

    pub fn lookup_association(&self, attribute: &str) -> Option<&AssociationInfo> {
        self.associations.get(attribute)
    }

    /// The column holding the entity key.
    pub fn key_column(&self) -> Option<&ColumnInfo> {
        self.columns.get(&self.key)
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: Nullable,
}

/// A to-one association, stored as a foreign key column on the owning table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociationInfo {
    /// The entity this association points at.
    pub target_entity: String,
    pub foreign_key_column: String,
    #[serde(default)]
    pub nullable: Nullable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scalar_type_survives_its_sql_type_name() {
        for scalar_type in enum_iterator::all::<ScalarType>() {
            assert_eq!(
                ScalarType::from_sql_type_name(scalar_type.sql_type_name()),
                scalar_type,
                "The scalar type {scalar_type:?} does not map back from its column type."
            );
        }
    }

    #[test]
    fn test_table_info_deserializes_with_defaults() {
        let table: TableInfo = serde_json::from_str(
            r#"{
                "tableName": "team",
                "key": "id",
                "columns": {
                    "id": { "name": "team_id", "type": "integer", "nullable": "NonNullable" },
                    "name": { "name": "name", "type": "text" }
                }
            }"#,
        )
        .unwrap();

        assert!(table.associations.is_empty());
        assert_eq!(table.key_column().unwrap().name, "team_id");
        assert_eq!(table.lookup_column("name").unwrap().nullable, Nullable::Nullable);
    }
}
