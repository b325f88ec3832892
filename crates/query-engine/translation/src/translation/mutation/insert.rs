//! Translate the insertion of a new entity.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, Mutation};
use querydsl_models as models;

use super::attribute_column;
use crate::translation::error::Error;
use crate::translation::helpers::Env;
use crate::translation::query::values;

/// Translate an insert. Attributes that are not given take the column default, which
/// for the key lets the database assign it.
pub fn translate_insert(
    metadata: &metadata::Metadata,
    insert: &models::InsertDescriptor,
) -> Result<ExecutionPlan<Mutation>, Error> {
    let env = Env::new(metadata);
    let info = env.lookup_table(&insert.entity)?;

    let mut columns = vec![];
    let mut values = vec![];
    for (attribute, value) in &insert.values {
        columns.push(attribute_column(&insert.entity, info, attribute)?);
        values.push(sql::ast::Expression::Value(values::translate_value(value)));
    }

    Ok(sql::execution_plan::simple_mutation_plan(Mutation::Insert(
        sql::ast::Insert {
            table: sql::ast::TableName(info.table_name.clone()),
            columns,
            values,
        },
    )))
}
