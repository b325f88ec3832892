//! Execute a query plan against the database and decode its rows.

use indexmap::IndexMap;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection, TypeInfo, ValueRef};
use tracing::{info_span, Instrument};

use query_engine_metadata::metadata::ScalarType;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ColumnLayout, EntityLayout, SelectItemLayout};
use querydsl_models as models;

use crate::error::{Error, QueryError};
use crate::metrics;

/// Execute a query and decode every row according to the layout of the plan.
pub async fn execute(
    connection: &mut SqliteConnection,
    metrics: &metrics::Metrics,
    plan: &sql::execution_plan::ExecutionPlan<sql::execution_plan::Query>,
) -> Result<Vec<models::ResultRow>, Error> {
    let query = plan.query.query_sql();

    tracing::info!(
        generated_sql = %query.sql,
        params = ?&query.params,
    );

    let rows: Vec<SqliteRow> = build_query_with_params(&query)
        .fetch_all(&mut *connection)
        .instrument(info_span!("Database request"))
        .await?;

    let results = async {
        rows.iter()
            .map(|row| decode_row(row, &plan.query.layout))
            .collect::<Result<Vec<_>, Error>>()
    }
    .instrument(info_span!("Decode rows"))
    .await?;

    metrics.query_total.inc();
    Ok(results)
}

/// Convert a query to an EXPLAIN QUERY PLAN query and execute it. Returns the pretty printed
/// query and the plan the database chose.
pub async fn explain(
    connection: &mut SqliteConnection,
    metrics: &metrics::Metrics,
    plan: &sql::execution_plan::ExecutionPlan<sql::execution_plan::Query>,
) -> Result<(String, String), Error> {
    let query = plan.query.explain_query_sql();

    tracing::info!(
        generated_sql = %query.sql,
        params = ?&query.params,
    );

    let rows: Vec<SqliteRow> = build_query_with_params(&query)
        .fetch_all(&mut *connection)
        .await?;

    let mut results: Vec<String> = vec![];
    for row in &rows {
        results.push(row.try_get("detail")?);
    }

    let pretty = sqlformat::format(
        &plan.query.query_sql().sql,
        &sqlformat::QueryParams::None,
        sqlformat::FormatOptions::default(),
    );

    metrics.explain_total.inc();
    Ok((pretty, results.join("\n")))
}

/// Create a SQLx query based on our SQL query and bind our parameters to it.
pub(crate) fn build_query_with_params(
    query: &sql::string::SQL,
) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    query
        .params
        .iter()
        .fold(sqlx::query(query.sql.as_str()), |sqlx_query, param| {
            match param {
                sql::string::Param::String(s) => sqlx_query.bind(s.as_str()),
                sql::string::Param::Int8(i) => sqlx_query.bind(*i),
                sql::string::Param::Float8(f) => sqlx_query.bind(*f),
                sql::string::Param::Bool(b) => sqlx_query.bind(*b),
                sql::string::Param::Null => sqlx_query.bind(Option::<i64>::None),
            }
        })
}

fn decode_row(row: &SqliteRow, layout: &[SelectItemLayout]) -> Result<models::ResultRow, Error> {
    layout
        .iter()
        .map(|item| match item {
            SelectItemLayout::Scalar(column) => {
                Ok(models::ResultItem::Scalar(decode_column(row, column)?))
            }
            SelectItemLayout::Entity(entity) => {
                Ok(models::ResultItem::Entity(decode_entity(row, entity)?))
            }
        })
        .collect::<Result<Vec<_>, Error>>()
        .map(models::ResultRow)
}

/// Decode an entity. A null key means an outer join found nothing, so there is no entity.
fn decode_entity(
    row: &SqliteRow,
    layout: &EntityLayout,
) -> Result<Option<models::EntityRecord>, Error> {
    let key = match decode_column(row, &layout.key)? {
        models::Value::Null => return Ok(None),
        models::Value::Integer(key) => key,
        other => {
            return Err(QueryError::UnexpectedType {
                column: layout.key.alias.name.clone(),
                expected: ScalarType::Integer,
                found: other.kind().to_string(),
            }
            .into())
        }
    };

    let mut attributes = IndexMap::new();
    for (attribute, column) in &layout.columns {
        attributes.insert(attribute.clone(), decode_column(row, column)?);
    }

    let mut associations = IndexMap::new();
    for association in &layout.associations {
        let state = match decode_column(row, &association.foreign_key)?.as_i64() {
            None => models::Association::Absent,
            Some(foreign_key) => {
                let fetched = match &association.fetched {
                    Some(fetched) => decode_entity(row, fetched)?,
                    None => None,
                };
                match fetched {
                    Some(record) => models::Association::Loaded(Box::new(record)),
                    None => models::Association::Unloaded {
                        entity: association.target_entity.clone(),
                        key: foreign_key,
                    },
                }
            }
        };
        associations.insert(association.name.clone(), state);
    }

    Ok(Some(models::EntityRecord {
        entity: layout.entity.clone(),
        key,
        attributes,
        associations,
    }))
}

/// Decode a single column. The value is read according to what the database holds and then
/// widened to the type the layout expects, as SQLite reports booleans as integers and may
/// store whole reals as integers.
#[allow(clippy::cast_precision_loss)]
fn decode_column(row: &SqliteRow, column: &ColumnLayout) -> Result<models::Value, Error> {
    let name = column.alias.name.as_str();
    let (is_null, type_name) = {
        let raw = row.try_get_raw(name)?;
        (raw.is_null(), raw.type_info().name().to_string())
    };
    if is_null {
        return Ok(models::Value::Null);
    }

    let value = match ScalarType::from_sql_type_name(&type_name) {
        ScalarType::Integer => models::Value::Integer(row.try_get_unchecked::<i64, _>(name)?),
        ScalarType::Real => models::Value::Real(row.try_get_unchecked::<f64, _>(name)?),
        ScalarType::Boolean => models::Value::Boolean(row.try_get_unchecked::<bool, _>(name)?),
        ScalarType::Text => models::Value::Text(row.try_get_unchecked::<String, _>(name)?),
    };

    Ok(match (column.r#type, value) {
        (Some(ScalarType::Real), models::Value::Integer(i)) => models::Value::Real(i as f64),
        (Some(ScalarType::Boolean), models::Value::Integer(i)) => models::Value::Boolean(i != 0),
        (_, value) => value,
    })
}
