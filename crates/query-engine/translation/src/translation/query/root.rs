//! Handle the translation of a whole query and of nested subqueries.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::SelectItemLayout;
use querydsl_models as models;

use super::fields;
use super::filtering;
use super::grouping;
use super::joins;
use super::sorting;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope, State};

/// Translate a top level query into a SQL select and the layout of its result rows.
pub fn translate_query(
    env: &Env,
    state: &mut State,
    query: &models::QueryDescriptor,
) -> Result<(sql::ast::Select, Vec<SelectItemLayout>), Error> {
    let mut scope = Scope::root();
    let mut select = translate_query_part(env, &mut scope, query)?;
    let (columns, layout) = fields::translate_fields(env, state, &scope, query)?;
    select.select_list = sql::ast::SelectList::SelectList(columns);
    Ok((select, layout))
}

/// Translate a query nested in another one. It sees the aliases of `parent` and names its
/// output columns so the enclosing query can refer to them.
pub fn translate_subquery<'a>(
    env: &Env<'a>,
    parent: &Scope<'_, 'a>,
    query: &models::QueryDescriptor,
) -> Result<(sql::ast::Select, Vec<(String, Option<metadata::ScalarType>)>), Error> {
    let mut scope = Scope::nested(parent);
    let mut select = translate_query_part(env, &mut scope, query)?;
    let (columns, output) = fields::translate_subquery_fields(env, &scope, query)?;
    select.select_list = sql::ast::SelectList::SelectList(columns);
    Ok((select, output))
}

/// Translate everything but the select list, declaring the query's aliases in `scope`.
fn translate_query_part<'a>(
    env: &Env<'a>,
    scope: &mut Scope<'_, 'a>,
    query: &models::QueryDescriptor,
) -> Result<sql::ast::Select, Error> {
    if let Some(modifier) = query.unattached_modifiers.first() {
        return Err(Error::ModifierWithoutJoin(match modifier {
            models::JoinModifier::On(_) => "on",
            models::JoinModifier::FetchJoin => "fetch_join",
        }));
    }
    if query.select.is_empty() {
        return Err(Error::EmptySelectList);
    }
    grouping::validate(query)?;

    let (from, joins) = joins::translate_sources(env, scope, query)?;

    let where_ = match &query.where_ {
        Some(predicate) => filtering::translate_expression(env, scope, predicate)?,
        None => sql::helpers::empty_where(),
    };

    let group_by = sql::ast::GroupBy {
        elements: query
            .group_by
            .iter()
            .map(|key| filtering::translate_expression(env, scope, key))
            .collect::<Result<Vec<_>, Error>>()?,
    };

    let having = match &query.having {
        Some(predicate) => sql::ast::Having(filtering::translate_expression(env, scope, predicate)?),
        None => sql::helpers::empty_having(),
    };

    let order_by = sorting::translate_order_by(env, scope, &query.order_by)?;

    let mut select = sql::helpers::simple_select(vec![]);
    select.from = from;
    select.joins = joins;
    select.where_ = sql::ast::Where(where_);
    select.group_by = group_by;
    select.having = having;
    select.order_by = order_by;
    select.limit = sql::ast::Limit {
        limit: query.limit,
        offset: query.offset,
    };
    Ok(select)
}
