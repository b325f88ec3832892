//! Helpers for processing descriptors and building SQL.

use query_engine_metadata::metadata;
use query_engine_sql::sql;

use super::error::Error;

/// Static information from the metadata.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    metadata: &'a metadata::Metadata,
}

impl<'a> Env<'a> {
    /// Create a new Env by supplying the metadata.
    pub fn new(metadata: &'a metadata::Metadata) -> Env<'a> {
        Env { metadata }
    }

    /// Lookup an entity's table information in the metadata.
    pub fn lookup_table(&self, entity: &str) -> Result<&'a metadata::TableInfo, Error> {
        self.metadata
            .lookup_table(entity)
            .ok_or_else(|| Error::EntityNotFound(entity.to_string()))
    }
}

/// Stateful information changed throughout the translation process.
#[derive(Debug, Default)]
pub struct State {
    column_index: u64,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    /// Generate a fresh column alias for an output column.
    pub fn make_column_alias(&mut self) -> sql::ast::ColumnAlias {
        let name = format!("c{}", self.column_index);
        self.column_index += 1;
        sql::helpers::make_column_alias(name)
    }
}

/// Something an alias in a query can refer to.
#[derive(Debug, Clone)]
pub enum Source<'a> {
    /// An entity's table.
    Table {
        entity: String,
        info: &'a metadata::TableInfo,
        reference: sql::ast::TableReference,
    },
    /// A subquery joined as a derived table, with its output columns.
    Derived {
        reference: sql::ast::TableReference,
        columns: Vec<(String, Option<metadata::ScalarType>)>,
    },
}

impl<'a> Source<'a> {
    /// Create the source of an entity queried under `alias`.
    pub fn aliased_table(env: &Env<'a>, entity: &str, alias: &str) -> Result<Source<'a>, Error> {
        Ok(Source::Table {
            entity: entity.to_string(),
            info: env.lookup_table(entity)?,
            reference: sql::ast::TableReference::AliasedTable(sql::helpers::make_table_alias(
                alias.to_string(),
            )),
        })
    }

    pub fn reference(&self) -> &sql::ast::TableReference {
        match self {
            Source::Table { reference, .. } | Source::Derived { reference, .. } => reference,
        }
    }

    /// Resolve an attribute to the column that holds it. Associations resolve to their
    /// foreign key column.
    pub fn resolve_attribute(
        &self,
        alias: &str,
        attribute: &str,
    ) -> Result<(sql::ast::ColumnReference, Option<metadata::ScalarType>), Error> {
        match self {
            Source::Table {
                entity,
                info,
                reference,
            } => {
                if let Some(column) = info.lookup_column(attribute) {
                    Ok((
                        sql::ast::ColumnReference::TableColumn {
                            table: reference.clone(),
                            name: sql::ast::ColumnName(column.name.clone()),
                        },
                        Some(column.r#type),
                    ))
                } else if let Some(association) = info.lookup_association(attribute) {
                    Ok((
                        sql::ast::ColumnReference::TableColumn {
                            table: reference.clone(),
                            name: sql::ast::ColumnName(association.foreign_key_column.clone()),
                        },
                        Some(metadata::ScalarType::Integer),
                    ))
                } else {
                    Err(Error::AttributeNotFound {
                        entity: entity.clone(),
                        attribute: attribute.to_string(),
                    })
                }
            }
            Source::Derived { reference, columns } => columns
                .iter()
                .find(|(name, _)| name == attribute)
                .map(|(name, scalar_type)| {
                    (
                        sql::ast::ColumnReference::AliasedColumn {
                            table: reference.clone(),
                            column: sql::helpers::make_column_alias(name.clone()),
                        },
                        *scalar_type,
                    )
                })
                .ok_or_else(|| Error::DerivedColumnNotFound {
                    alias: alias.to_string(),
                    column: attribute.to_string(),
                }),
        }
    }

    /// The column holding the key of the entity this alias refers to.
    pub fn key_reference(&self, alias: &str) -> Result<sql::ast::ColumnReference, Error> {
        match self {
            Source::Table { info, .. } => self
                .resolve_attribute(alias, &info.key)
                .map(|(reference, _)| reference),
            Source::Derived { .. } => Err(Error::NotAnEntity(alias.to_string())),
        }
    }
}

/// The aliases visible while translating one (sub)query. Subqueries get a nested scope,
/// so correlated references resolve through the parents.
#[derive(Debug)]
pub struct Scope<'s, 'a> {
    parent: Option<&'s Scope<'s, 'a>>,
    sources: Vec<(String, Source<'a>)>,
}

impl<'s, 'a> Scope<'s, 'a> {
    pub fn root() -> Scope<'s, 'a> {
        Scope {
            parent: None,
            sources: vec![],
        }
    }

    pub fn nested(parent: &'s Scope<'s, 'a>) -> Scope<'s, 'a> {
        Scope {
            parent: Some(parent),
            sources: vec![],
        }
    }

    /// Declare an alias. Aliases must be unique within a scope but may shadow outer ones.
    pub fn add_source(&mut self, alias: &str, source: Source<'a>) -> Result<(), Error> {
        if self.sources.iter().any(|(name, _)| name == alias) {
            return Err(Error::DuplicateAlias(alias.to_string()));
        }
        self.sources.push((alias.to_string(), source));
        Ok(())
    }

    /// Find the source of an alias in this scope or any enclosing one.
    pub fn lookup(&self, alias: &str) -> Result<&Source<'a>, Error> {
        match self.sources.iter().find(|(name, _)| name == alias) {
            Some((_, source)) => Ok(source),
            None => match self.parent {
                Some(parent) => parent.lookup(alias),
                None => Err(Error::AliasNotFound(alias.to_string())),
            },
        }
    }

    /// Find the source of an alias, requiring it to be a table of the given entity.
    pub fn lookup_entity(&self, alias: &str, entity: &str) -> Result<&Source<'a>, Error> {
        let source = self.lookup(alias)?;
        match source {
            Source::Table {
                entity: declared, ..
            } if declared != entity => Err(Error::AliasEntityMismatch {
                alias: alias.to_string(),
                expected: entity.to_string(),
                found: declared.clone(),
            }),
            _ => Ok(source),
        }
    }
}
