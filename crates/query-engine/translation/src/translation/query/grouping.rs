//! Check that grouped queries only select what the grouping allows.

use querydsl_models as models;

use crate::translation::error::Error;

/// When a query groups or aggregates, every selected item must be an aggregate, a grouping
/// key, a constant or a subquery, or be built only from those.
pub fn validate(query: &models::QueryDescriptor) -> Result<(), Error> {
    let aggregated = !query.group_by.is_empty()
        || query
            .select
            .iter()
            .any(models::Expression::contains_aggregate);

    if !aggregated {
        return Ok(());
    }

    let keys: Vec<&models::Expression> = query
        .group_by
        .iter()
        .map(models::Expression::unaliased)
        .collect();

    for item in &query.select {
        if !is_grouped(item.unaliased(), &keys) {
            return Err(Error::UngroupedExpression(describe(item)));
        }
    }
    Ok(())
}

fn is_grouped(expression: &models::Expression, keys: &[&models::Expression]) -> bool {
    if keys.contains(&expression) {
        return true;
    }
    match expression {
        models::Expression::Aggregate { .. }
        | models::Expression::Literal(_)
        | models::Expression::SubQuery(_) => true,
        models::Expression::Path(_)
        | models::Expression::Entity(_)
        | models::Expression::DerivedColumn { .. } => false,
        models::Expression::Comparison { left, right, .. }
        | models::Expression::Binary { left, right, .. }
        | models::Expression::And(left, right)
        | models::Expression::Or(left, right) => {
            is_grouped(left, keys) && is_grouped(right, keys)
        }
        models::Expression::InList { expression, values } => {
            is_grouped(expression, keys) && values.iter().all(|value| is_grouped(value, keys))
        }
        models::Expression::InSubQuery { expression, .. }
        | models::Expression::IsNull(expression)
        | models::Expression::IsNotNull(expression)
        | models::Expression::Not(expression) => is_grouped(expression, keys),
        models::Expression::Alias { expression, .. } => is_grouped(expression.unaliased(), keys),
        models::Expression::Function { args, .. } | models::Expression::Template { args, .. } => {
            args.iter().all(|arg| is_grouped(arg, keys))
        }
    }
}

/// A short human readable name for an expression in error messages.
fn describe(expression: &models::Expression) -> String {
    match expression.unaliased() {
        models::Expression::Path(path) => format!("{}.{}", path.root.alias, path.attribute),
        models::Expression::Entity(entity) => entity.alias.clone(),
        models::Expression::DerivedColumn { alias, column } => format!("{alias}.{column}"),
        _ => expression
            .output_name()
            .map_or_else(|| "expression".to_string(), ToString::to_string),
    }
}
