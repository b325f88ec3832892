//! A fresh in-memory database holding two teams and seven members.

use sqlx::Executor;

use querydsl::{QueryFactory, Session, State};
use querydsl_configuration::environment::FixedEnvironment;

use crate::deployment::{get_deployment_dir, read_schema};
use crate::entities::{Member, Team};

pub struct Fixture {
    pub state: State,
    pub factory: QueryFactory,
    pub session: Session,
}

/// Create the state from the static configuration and the tables it maps.
pub async fn create_state() -> anyhow::Result<State> {
    let _ = env_logger::builder().is_test(true).try_init();

    let parsed_configuration =
        querydsl_configuration::parse_configuration(get_deployment_dir()).await?;
    let configuration = querydsl_configuration::make_runtime_configuration(
        parsed_configuration,
        FixedEnvironment::default(),
    )?;

    let state = querydsl::create_state(&configuration, &mut prometheus::Registry::new()).await?;
    state.pool.execute(read_schema().await?.as_str()).await?;
    Ok(state)
}

/// teamA holds member1 (10) and member2 (20); teamB holds member3 (30), member4 (40), a
/// member without a username (50), park (60) and pen (70).
pub async fn fixture() -> anyhow::Result<Fixture> {
    let state = create_state().await?;
    let factory = state.factory.clone();
    let mut session = state.session().await?;

    let mut team_a = Team::new("teamA");
    let mut team_b = Team::new("teamB");
    factory.persist(&mut session, &mut team_a).await?;
    factory.persist(&mut session, &mut team_b).await?;

    let members = [
        (Some("member1"), 10, &team_a),
        (Some("member2"), 20, &team_a),
        (Some("member3"), 30, &team_b),
        (Some("member4"), 40, &team_b),
        (None, 50, &team_b),
        (Some("park"), 60, &team_b),
        (Some("pen"), 70, &team_b),
    ];
    for (username, age, team) in members {
        let mut member = Member::new(username, age, Some(team));
        factory.persist(&mut session, &mut member).await?;
    }
    tracing::info!(managed = session.managed(), "seeded");

    Ok(Fixture {
        state,
        factory,
        session,
    })
}
