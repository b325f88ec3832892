//! Translate expressions, including the predicates of where, having and on clauses.

use query_engine_sql::sql;
use querydsl_models as models;

use super::root;
use super::templates;
use super::values;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope};

/// Translate an expression to a SQL expression in the given scope.
pub fn translate_expression(
    env: &Env,
    scope: &Scope,
    expression: &models::Expression,
) -> Result<sql::ast::Expression, Error> {
    match expression {
        models::Expression::Path(path) => {
            let source = scope.lookup_entity(&path.root.alias, &path.root.entity)?;
            let (reference, _) = source.resolve_attribute(&path.root.alias, &path.attribute)?;
            Ok(sql::ast::Expression::ColumnReference(reference))
        }
        // anywhere but the select list an entity stands for its key
        models::Expression::Entity(entity) => {
            let source = scope.lookup_entity(&entity.alias, &entity.entity)?;
            Ok(sql::ast::Expression::ColumnReference(
                source.key_reference(&entity.alias)?,
            ))
        }
        models::Expression::DerivedColumn { alias, column } => {
            let (reference, _) = scope.lookup(alias)?.resolve_attribute(alias, column)?;
            Ok(sql::ast::Expression::ColumnReference(reference))
        }
        models::Expression::Literal(value) => {
            Ok(sql::ast::Expression::Value(values::translate_value(value)))
        }
        models::Expression::Comparison {
            left,
            operator,
            right,
        } => Ok(sql::ast::Expression::BinaryOperation {
            left: Box::new(translate_expression(env, scope, left)?),
            operator: translate_comparison_operator(*operator),
            right: Box::new(translate_expression(env, scope, right)?),
        }),
        models::Expression::InList { expression, values } => {
            Ok(sql::ast::Expression::BinaryArrayOperation {
                left: Box::new(translate_expression(env, scope, expression)?),
                operator: sql::ast::BinaryArrayOperator::In,
                right: values
                    .iter()
                    .map(|value| translate_expression(env, scope, value))
                    .collect::<Result<Vec<_>, Error>>()?,
            })
        }
        models::Expression::InSubQuery { expression, query } => {
            let select = translate_scalar_subquery(env, scope, query)?;
            Ok(sql::ast::Expression::BinarySubSelectOperation {
                left: Box::new(translate_expression(env, scope, expression)?),
                operator: sql::ast::BinaryArrayOperator::In,
                select: Box::new(select),
            })
        }
        models::Expression::IsNull(expression) => Ok(sql::ast::Expression::UnaryOperation {
            expression: Box::new(translate_expression(env, scope, expression)?),
            operator: sql::ast::UnaryOperator::IsNull,
        }),
        models::Expression::IsNotNull(expression) => Ok(sql::ast::Expression::UnaryOperation {
            expression: Box::new(translate_expression(env, scope, expression)?),
            operator: sql::ast::UnaryOperator::IsNotNull,
        }),
        models::Expression::And(left, right) => Ok(sql::ast::Expression::And {
            left: Box::new(translate_expression(env, scope, left)?),
            right: Box::new(translate_expression(env, scope, right)?),
        }),
        models::Expression::Or(left, right) => Ok(sql::ast::Expression::Or {
            left: Box::new(translate_expression(env, scope, left)?),
            right: Box::new(translate_expression(env, scope, right)?),
        }),
        models::Expression::Not(expression) => Ok(sql::ast::Expression::Not(Box::new(
            translate_expression(env, scope, expression)?,
        ))),
        models::Expression::Binary {
            left,
            operator,
            right,
        } => Ok(sql::ast::Expression::BinaryOperation {
            left: Box::new(translate_expression(env, scope, left)?),
            operator: translate_binary_operator(*operator),
            right: Box::new(translate_expression(env, scope, right)?),
        }),
        models::Expression::Function { function, args } => {
            Ok(sql::ast::Expression::FunctionCall {
                function: match function {
                    models::Function::Upper => sql::ast::Function::Upper,
                    models::Function::Lower => sql::ast::Function::Lower,
                    models::Function::Length => sql::ast::Function::Length,
                    models::Function::Coalesce => sql::ast::Function::Coalesce,
                    models::Function::Named(name) => sql::ast::Function::Unknown(name.clone()),
                },
                args: args
                    .iter()
                    .map(|arg| translate_expression(env, scope, arg))
                    .collect::<Result<Vec<_>, Error>>()?,
            })
        }
        models::Expression::Template { template, args } => {
            let args = args
                .iter()
                .map(|arg| translate_expression(env, scope, arg))
                .collect::<Result<Vec<_>, Error>>()?;
            templates::expand(template, args)
        }
        models::Expression::Aggregate {
            function,
            argument,
            distinct,
        } => translate_aggregate(env, scope, *function, argument.as_deref(), *distinct),
        models::Expression::SubQuery(query) => Ok(sql::ast::Expression::CorrelatedSubSelect(
            Box::new(translate_scalar_subquery(env, scope, query)?),
        )),
        models::Expression::Alias { expression, .. } => {
            translate_expression(env, scope, expression)
        }
    }
}

fn translate_aggregate(
    env: &Env,
    scope: &Scope,
    function: models::AggregateFunction,
    argument: Option<&models::Expression>,
    distinct: bool,
) -> Result<sql::ast::Expression, Error> {
    let argument = argument
        .map(|argument| translate_expression(env, scope, argument))
        .transpose()?;

    let function = match function {
        models::AggregateFunction::Count => {
            return Ok(sql::ast::Expression::Count(match argument {
                None => sql::ast::CountType::Star,
                Some(argument) if distinct => sql::ast::CountType::Distinct(Box::new(argument)),
                Some(argument) => sql::ast::CountType::Simple(Box::new(argument)),
            }))
        }
        models::AggregateFunction::Sum => sql::ast::Function::Sum,
        models::AggregateFunction::Avg => sql::ast::Function::Avg,
        models::AggregateFunction::Max => sql::ast::Function::Max,
        models::AggregateFunction::Min => sql::ast::Function::Min,
    };

    if distinct {
        return Err(Error::NotSupported(
            "DISTINCT aggregates other than count".to_string(),
        ));
    }

    match argument {
        Some(argument) => Ok(sql::ast::Expression::FunctionCall {
            function,
            args: vec![argument],
        }),
        None => Err(Error::NotSupported(
            "aggregates without an argument other than count".to_string(),
        )),
    }
}

/// A subquery used as a value or as the right-hand side of `IN`: it sees the enclosing
/// aliases and must produce a single column.
fn translate_scalar_subquery(
    env: &Env,
    scope: &Scope,
    query: &models::QueryDescriptor,
) -> Result<sql::ast::Select, Error> {
    if query.select.len() != 1 {
        return Err(Error::SubQueryArity(query.select.len()));
    }
    let (select, _) = root::translate_subquery(env, scope, query)?;
    Ok(select)
}

pub fn translate_comparison_operator(
    operator: models::ComparisonOperator,
) -> sql::ast::BinaryOperator {
    let name = match operator {
        models::ComparisonOperator::Equal => "=",
        models::ComparisonOperator::NotEqual => "<>",
        models::ComparisonOperator::GreaterThan => ">",
        models::ComparisonOperator::GreaterThanOrEqual => ">=",
        models::ComparisonOperator::LessThan => "<",
        models::ComparisonOperator::LessThanOrEqual => "<=",
        models::ComparisonOperator::Like => "LIKE",
        models::ComparisonOperator::NotLike => "NOT LIKE",
    };
    sql::ast::BinaryOperator(name.to_string())
}

pub fn translate_binary_operator(operator: models::BinaryOperator) -> sql::ast::BinaryOperator {
    let name = match operator {
        models::BinaryOperator::Add => "+",
        models::BinaryOperator::Subtract => "-",
        models::BinaryOperator::Multiply => "*",
        models::BinaryOperator::Divide => "/",
        models::BinaryOperator::Concat => "||",
    };
    sql::ast::BinaryOperator(name.to_string())
}
