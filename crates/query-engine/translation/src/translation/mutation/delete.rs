//! Translate bulk deletes.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, Mutation};
use querydsl_models as models;

use super::target_scope;
use crate::translation::error::Error;
use crate::translation::helpers::Env;
use crate::translation::query::filtering;

/// Translate a bulk delete. Without a predicate every row of the table is deleted.
pub fn translate_delete(
    metadata: &metadata::Metadata,
    delete: &models::DeleteDescriptor,
) -> Result<ExecutionPlan<Mutation>, Error> {
    let env = Env::new(metadata);
    let (info, scope) = target_scope(&env, &delete.target.entity, &delete.target.alias)?;

    let where_ = match &delete.where_ {
        Some(predicate) => filtering::translate_expression(&env, &scope, predicate)?,
        None => sql::helpers::empty_where(),
    };

    Ok(sql::execution_plan::simple_mutation_plan(Mutation::Delete(
        sql::ast::Delete {
            table: sql::ast::TableName(info.table_name.clone()),
            where_: sql::ast::Where(where_),
        },
    )))
}
