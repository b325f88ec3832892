//! Translate a query descriptor into a SQL select and the layout of its result rows.

mod fields;
pub mod filtering;
mod grouping;
mod joins;
mod root;
pub mod sorting;
mod templates;
pub mod typing;
pub mod values;

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ColumnLayout, SelectItemLayout};
use querydsl_models as models;

use crate::translation::error::Error;
use crate::translation::helpers::{Env, State};

/// Translate a query to an execution plan (SQL) to be run against the database.
pub fn translate(
    metadata: &metadata::Metadata,
    query: &models::QueryDescriptor,
) -> Result<sql::execution_plan::ExecutionPlan<sql::execution_plan::Query>, Error> {
    let env = Env::new(metadata);
    let mut state = State::new();
    let (select, layout) = root::translate_query(&env, &mut state, query)?;

    tracing::debug!(select = ?select, "translated query");

    Ok(sql::execution_plan::simple_query_plan(select, layout))
}

/// Translate a query into one that counts the rows it would return, ignoring its offset
/// and limit.
pub fn translate_count(
    metadata: &metadata::Metadata,
    query: &models::QueryDescriptor,
) -> Result<sql::execution_plan::ExecutionPlan<sql::execution_plan::Query>, Error> {
    let env = Env::new(metadata);
    let mut state = State::new();
    let unpaged = query.without_paging();
    let (select, _) = root::translate_query(&env, &mut state, &unpaged)?;

    let layout = vec![SelectItemLayout::Scalar(ColumnLayout {
        alias: sql::helpers::make_column_alias(sql::helpers::COUNT_COLUMN_ALIAS.to_string()),
        r#type: Some(metadata::ScalarType::Integer),
    })];

    Ok(sql::execution_plan::simple_query_plan(
        sql::helpers::count_select(select),
        layout,
    ))
}
