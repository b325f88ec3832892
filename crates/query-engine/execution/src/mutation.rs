//! Execute inserts, updates and deletes.

use sqlx::SqliteConnection;
use tracing::{info_span, Instrument};

use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, Mutation};

use crate::error::{Error, QueryError};
use crate::metrics;
use crate::query::build_query_with_params;

/// Execute an update or delete and return the number of rows it changed.
pub async fn execute(
    connection: &mut SqliteConnection,
    metrics: &metrics::Metrics,
    plan: &ExecutionPlan<Mutation>,
) -> Result<u64, Error> {
    let rows_affected = run(connection, plan)
        .instrument(info_span!("Execute mutation"))
        .await?
        .rows_affected();

    metrics.mutation_total.inc();
    metrics.rows_affected_total.inc_by(rows_affected);
    Ok(rows_affected)
}

/// Execute an insert and return the key the database generated for the new row. Inserts
/// count as mutations but not as affected rows.
pub async fn insert(
    connection: &mut SqliteConnection,
    metrics: &metrics::Metrics,
    plan: &ExecutionPlan<Mutation>,
) -> Result<i64, Error> {
    if !matches!(plan.query, Mutation::Insert(_)) {
        return Err(QueryError::UnexpectedMutation("insert").into());
    }

    let result = run(connection, plan)
        .instrument(info_span!("Execute insert"))
        .await?;

    metrics.mutation_total.inc();
    Ok(result.last_insert_rowid())
}

async fn run(
    connection: &mut SqliteConnection,
    plan: &ExecutionPlan<Mutation>,
) -> Result<sqlx::sqlite::SqliteQueryResult, Error> {
    let query: sql::string::SQL = plan.query.query_sql();

    tracing::info!(
        generated_sql = %query.sql,
        params = ?&query.params,
    );

    Ok(build_query_with_params(&query)
        .execute(&mut *connection)
        .await?)
}
