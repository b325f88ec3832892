//! Translate bulk updates and the updates of single entities.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, Mutation};
use querydsl_models as models;

use super::{attribute_column, target_scope};
use crate::translation::error::Error;
use crate::translation::helpers::Env;
use crate::translation::query::{filtering, values};

/// Translate a bulk update. Assignments keep their order and every assigned value may refer
/// to the current values of the row.
pub fn translate_update(
    metadata: &metadata::Metadata,
    update: &models::UpdateDescriptor,
) -> Result<ExecutionPlan<Mutation>, Error> {
    if update.assignments.is_empty() {
        return Err(Error::NoAssignments);
    }

    let env = Env::new(metadata);
    let target = &update.target;
    let (info, scope) = target_scope(&env, &target.entity, &target.alias)?;

    let set = update
        .assignments
        .iter()
        .map(|(attribute, value)| {
            let column = match attribute {
                models::Expression::Path(path)
                    if path.root.alias == target.alias && path.root.entity == target.entity =>
                {
                    attribute_column(&target.entity, info, &path.attribute)?
                }
                models::Expression::Path(path) => {
                    return Err(Error::InvalidAssignmentTarget(format!(
                        "{}.{}",
                        path.root.alias, path.attribute
                    )))
                }
                other => {
                    return Err(Error::InvalidAssignmentTarget(
                        other
                            .output_name()
                            .map_or_else(|| "expression".to_string(), ToString::to_string),
                    ))
                }
            };
            Ok((column, filtering::translate_expression(&env, &scope, value)?))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let where_ = match &update.where_ {
        Some(predicate) => filtering::translate_expression(&env, &scope, predicate)?,
        None => sql::helpers::empty_where(),
    };

    Ok(sql::execution_plan::simple_mutation_plan(Mutation::Update(
        sql::ast::Update {
            table: sql::ast::TableName(info.table_name.clone()),
            set,
            where_: sql::ast::Where(where_),
        },
    )))
}

/// Translate the update of one entity identified by its key.
pub fn translate_keyed_update(
    metadata: &metadata::Metadata,
    update: &models::KeyedUpdateDescriptor,
) -> Result<ExecutionPlan<Mutation>, Error> {
    if update.values.is_empty() {
        return Err(Error::NoAssignments);
    }

    let env = Env::new(metadata);
    let info = env.lookup_table(&update.entity)?;
    let key_column = attribute_column(&update.entity, info, &info.key)?;

    let set = update
        .values
        .iter()
        .map(|(attribute, value)| {
            Ok((
                attribute_column(&update.entity, info, attribute)?,
                sql::ast::Expression::Value(values::translate_value(value)),
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let where_ = sql::ast::Expression::BinaryOperation {
        left: Box::new(sql::ast::Expression::ColumnReference(
            sql::ast::ColumnReference::TableColumn {
                table: sql::helpers::db_table(&info.table_name),
                name: key_column,
            },
        )),
        operator: filtering::translate_comparison_operator(models::ComparisonOperator::Equal),
        right: Box::new(sql::ast::Expression::Value(sql::ast::Value::Int8(
            update.key,
        ))),
    };

    Ok(sql::execution_plan::simple_mutation_plan(Mutation::Update(
        sql::ast::Update {
            table: sql::ast::TableName(info.table_name.clone()),
            set,
            where_: sql::ast::Where(where_),
        },
    )))
}
