//! Runtime state: the connection pool, metrics and the query factory.
//!
//! This is created once from the runtime configuration. Each unit of work takes a
//! [`Session`] from it.

use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{info_span, Instrument};

use query_engine_execution::{metrics, Session};
use querydsl_configuration::values::PoolSettings;
use querydsl_configuration::Configuration;

use crate::error::Error;
use crate::factory::QueryFactory;

#[derive(Debug, Clone)]
pub struct State {
    pub pool: SqlitePool,
    pub metrics: metrics::Metrics,
    pub factory: QueryFactory,
}

impl State {
    /// Take a connection from the pool for a new unit of work.
    pub async fn session(&self) -> Result<Session, Error> {
        let connection = self
            .pool
            .acquire()
            .instrument(info_span!("Acquire connection"))
            .await?;
        metrics::update_pool_metrics(&self.pool, &self.metrics);
        Ok(Session::new(connection, self.metrics.clone()))
    }
}

/// Create a connection pool and wrap it inside a State.
pub async fn create_state(
    configuration: &Configuration,
    metrics_registry: &mut prometheus::Registry,
) -> Result<State, InitializationError> {
    let pool = create_pool(&configuration.connection_uri, &configuration.pool_settings)
        .instrument(info_span!("Create connection pool"))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let metrics = async {
        metrics::initialise_metrics(metrics_registry)
            .map_err(InitializationError::MetricsError)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    metrics::update_pool_metrics(&pool, &metrics);

    Ok(State {
        pool,
        metrics,
        factory: QueryFactory::new(configuration.metadata.clone()),
    })
}

/// Create a connection pool with the configured settings.
async fn create_pool(
    connection_uri: &str,
    pool_settings: &PoolSettings,
) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.pool_timeout))
        .idle_timeout(pool_settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(pool_settings.connection_lifetime.map(Duration::from_secs))
        .connect(connection_uri)
        .await
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(query_engine_execution::error::Error),
}
