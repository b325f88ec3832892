use query_engine_execution::metrics;
use query_engine_execution::Session;
use query_engine_metadata::metadata;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Executor;

const SCHEMA: &str = include_str!("../../../../../static/schema.sql");

const SEED: &str = "
    INSERT INTO team (name) VALUES ('teamA'), ('teamB');
    INSERT INTO member (username, age, team_id) VALUES
        ('member1', 10, 1),
        ('member2', 20, 1),
        ('member3', 30, 2),
        ('member4', 40, 2),
        (NULL, 50, 2),
        ('park', 60, 2),
        ('pen', 70, 2);
";

pub struct Fixture {
    pub metadata: metadata::Metadata,
    pub session: Session,
}

/// A session over a fresh in-memory database holding two teams and seven members.
pub async fn fixture() -> anyhow::Result<Fixture> {
    let _ = env_logger::builder().is_test(true).try_init();

    let parsed_configuration =
        querydsl_configuration::parse_configuration("../../../static").await?;
    let configuration = querydsl_configuration::make_runtime_configuration(
        parsed_configuration,
        querydsl_configuration::environment::FixedEnvironment::default(),
    )?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(&configuration.connection_uri)
        .await?;
    let mut connection = pool.acquire().await?;
    connection.execute(SCHEMA).await?;
    connection.execute(SEED).await?;

    let metrics = metrics::initialise_metrics(&mut prometheus::Registry::new())?;

    Ok(Fixture {
        metadata: configuration.metadata,
        session: Session::new(connection, metrics),
    })
}
