//! Static inference of the scalar type an expression produces.
//!
//! The inferred type decides how a result column is decoded and lets projections check
//! constructor parameters before anything runs. `None` means the type is only known at
//! runtime.

use query_engine_metadata::metadata::ScalarType;
use querydsl_models as models;

use super::root;
use super::values;
use crate::translation::helpers::{Env, Scope};

pub fn infer_type(env: &Env, scope: &Scope, expression: &models::Expression) -> Option<ScalarType> {
    match expression {
        models::Expression::Path(path) => scope
            .lookup(&path.root.alias)
            .ok()?
            .resolve_attribute(&path.root.alias, &path.attribute)
            .ok()?
            .1,
        models::Expression::Entity(_) => Some(ScalarType::Integer),
        models::Expression::DerivedColumn { alias, column } => {
            scope.lookup(alias).ok()?.resolve_attribute(alias, column).ok()?.1
        }
        models::Expression::Literal(value) => values::value_type(value),
        models::Expression::Comparison { .. }
        | models::Expression::InList { .. }
        | models::Expression::InSubQuery { .. }
        | models::Expression::IsNull(_)
        | models::Expression::IsNotNull(_)
        | models::Expression::And(_, _)
        | models::Expression::Or(_, _)
        | models::Expression::Not(_) => Some(ScalarType::Boolean),
        models::Expression::Binary {
            left,
            operator,
            right,
        } => match operator {
            models::BinaryOperator::Concat => Some(ScalarType::Text),
            _ => numeric_result(
                infer_type(env, scope, left)?,
                infer_type(env, scope, right)?,
            ),
        },
        models::Expression::Function { function, args } => match function {
            models::Function::Upper | models::Function::Lower => Some(ScalarType::Text),
            models::Function::Length => Some(ScalarType::Integer),
            models::Function::Coalesce => args.iter().find_map(|arg| infer_type(env, scope, arg)),
            models::Function::Named(_) => None,
        },
        models::Expression::Template { .. } => None,
        models::Expression::Aggregate {
            function,
            argument,
            ..
        } => match function {
            models::AggregateFunction::Count => Some(ScalarType::Integer),
            models::AggregateFunction::Avg => Some(ScalarType::Real),
            models::AggregateFunction::Sum
            | models::AggregateFunction::Max
            | models::AggregateFunction::Min => infer_type(env, scope, argument.as_deref()?),
        },
        models::Expression::SubQuery(query) => {
            let (_, columns) = root::translate_subquery(env, scope, query).ok()?;
            columns.into_iter().next()?.1
        }
        models::Expression::Alias { expression, .. } => infer_type(env, scope, expression),
    }
}

/// Integer arithmetic stays integral; anything involving a real is real.
fn numeric_result(left: ScalarType, right: ScalarType) -> Option<ScalarType> {
    match (left, right) {
        (ScalarType::Integer, ScalarType::Integer) => Some(ScalarType::Integer),
        (ScalarType::Integer | ScalarType::Real, ScalarType::Integer | ScalarType::Real) => {
            Some(ScalarType::Real)
        }
        _ => None,
    }
}
