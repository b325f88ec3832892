//! Translate descriptors of statements that change storage.

mod delete;
mod insert;
mod update;

pub use delete::translate_delete;
pub use insert::translate_insert;
pub use update::{translate_keyed_update, translate_update};

use query_engine_metadata::metadata;
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope, Source};

/// Mutations cannot alias their table, so the target alias refers to the table by name.
fn target_scope<'a>(
    env: &Env<'a>,
    entity: &str,
    alias: &str,
) -> Result<(&'a metadata::TableInfo, Scope<'a, 'a>), Error> {
    let info = env.lookup_table(entity)?;
    let mut scope = Scope::root();
    scope.add_source(
        alias,
        Source::Table {
            entity: entity.to_string(),
            info,
            reference: sql::helpers::db_table(&info.table_name),
        },
    )?;
    Ok((info, scope))
}

/// The column an attribute is stored in. Associations are stored as their foreign key.
fn attribute_column(
    entity: &str,
    info: &metadata::TableInfo,
    attribute: &str,
) -> Result<sql::ast::ColumnName, Error> {
    info.lookup_column(attribute)
        .map(|column| column.name.clone())
        .or_else(|| {
            info.lookup_association(attribute)
                .map(|association| association.foreign_key_column.clone())
        })
        .map(sql::ast::ColumnName)
        .ok_or_else(|| Error::AttributeNotFound {
            entity: entity.to_string(),
            attribute: attribute.to_string(),
        })
}
