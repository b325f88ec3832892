//! Translate order by clauses.

use query_engine_sql::sql;
use querydsl_models as models;

use super::filtering;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope};

/// Convert the order by fields of a query to SQL, keeping their order.
pub fn translate_order_by(
    env: &Env,
    scope: &Scope,
    order_by: &[models::OrderSpecifier],
) -> Result<sql::ast::OrderBy, Error> {
    let elements = order_by
        .iter()
        .map(|specifier| {
            Ok(sql::ast::OrderByElement {
                target: filtering::translate_expression(env, scope, &specifier.target)?,
                direction: match specifier.direction {
                    models::Direction::Asc => sql::ast::OrderByDirection::Asc,
                    models::Direction::Desc => sql::ast::OrderByDirection::Desc,
                },
                nulls: match specifier.nulls {
                    models::NullHandling::Default => None,
                    models::NullHandling::NullsFirst => Some(sql::ast::NullsOrder::First),
                    models::NullHandling::NullsLast => Some(sql::ast::NullsOrder::Last),
                },
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(sql::ast::OrderBy { elements })
}
