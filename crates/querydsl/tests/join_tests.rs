use querydsl::{select, EntityPath, Expression, Lazy, Projections};
use tests_common::entities::{member, team, Member, Team};
use tests_common::fixtures::{fixture, Fixture};

fn member_sub() -> EntityPath {
    EntityPath::new("Member", "member_sub")
}

fn usernames(members: &[Member]) -> Vec<Option<&str>> {
    members.iter().map(|m| m.username.as_deref()).collect()
}

fn ages(members: &[Member]) -> Vec<i32> {
    members.iter().map(|m| m.age).collect()
}

async fn persist_members_named_after_teams(fixture: &mut Fixture) -> anyhow::Result<()> {
    for username in ["teamA", "teamB"] {
        fixture
            .factory
            .persist(&mut fixture.session, &mut Member::named(username))
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn join_along_an_association() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .join(&member().get("team"), &team())
        .where_(team().get("name").expr().eq("teamA"))
        .order_by([member().get("age").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(usernames(&result), vec![Some("member1"), Some("member2")]);
    Ok(())
}

#[tokio::test]
async fn theta_join_between_unrelated_sources() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    persist_members_named_after_teams(&mut fixture).await?;

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .from(&team())
        .where_(member().get("username").expr().eq(team().get("name")))
        .order_by([member().get("username").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(usernames(&result), vec![Some("teamA"), Some("teamB")]);
    Ok(())
}

#[tokio::test]
async fn cross_join_pairs_every_member_with_every_team() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let pairs = fixture
        .factory
        .select(Projections::tuple([member().expr(), team().expr()]))
        .from(&member())
        .cross_join(&team());

    let product = pairs.fetch(&mut fixture.session).await?;
    let total = pairs.fetch_count(&mut fixture.session).await?;

    assert_eq!(product.len(), 14);
    assert_eq!(total, 14);

    persist_members_named_after_teams(&mut fixture).await?;
    let named_after = pairs
        .on(member().get("username").expr().eq(team().get("name")))
        .fetch(&mut fixture.session)
        .await?;
    assert_eq!(named_after.len(), 2);
    Ok(())
}

#[tokio::test]
async fn left_join_on_keeps_every_member() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;

    let result = fixture
        .factory
        .select(Projections::tuple([member().expr(), team().expr()]))
        .from(&member())
        .left_join(&member().get("team"), &team())
        .on(team().get("name").expr().eq("teamA"))
        .order_by([member().get("age").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(result.len(), 7);
    let teams: Vec<Option<Team>> = result
        .iter()
        .map(|tuple| tuple.entity::<Team>(&team()))
        .collect::<Result<_, _>>()?;
    let team_names: Vec<Option<&str>> = teams
        .iter()
        .map(|team| team.as_ref().map(|team| team.name.as_str()))
        .collect();
    assert_eq!(
        team_names,
        vec![Some("teamA"), Some("teamA"), None, None, None, None, None]
    );
    Ok(())
}

#[tokio::test]
async fn left_join_on_an_unrelated_entity() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    persist_members_named_after_teams(&mut fixture).await?;

    let result = fixture
        .factory
        .select(Projections::tuple([member().expr(), team().expr()]))
        .from(&member())
        .left_join_entity(&team())
        .on(member().get("username").expr().eq(team().get("name")))
        .order_by([member().get("username").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(result.len(), 9);
    let matched: Vec<(Option<String>, String)> = result
        .iter()
        .filter_map(|tuple| {
            let member = tuple.entity::<Member>(&member()).ok()??;
            let team = tuple.entity::<Team>(&team()).ok()??;
            Some((member.username, team.name))
        })
        .collect();
    assert_eq!(
        matched,
        vec![
            (Some("teamA".to_string()), "teamA".to_string()),
            (Some("teamB".to_string()), "teamB".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn plain_join_leaves_the_association_unloaded() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    fixture.session.flush().await?;
    fixture.session.clear();

    let found = fixture
        .factory
        .select_from::<Member>(&member())
        .join(&member().get("team"), &team())
        .where_(member().get("username").expr().eq("member1"))
        .fetch_one(&mut fixture.session)
        .await?;
    let mut found = found.expect("member1 exists");

    assert!(!found.team.is_loaded());
    assert!(matches!(found.team, Lazy::Unloaded(_)));

    let team = found
        .team
        .load(&fixture.factory, &mut fixture.session)
        .await?;
    assert_eq!(team.map(|team| team.name.as_str()), Some("teamA"));
    assert!(found.team.is_loaded());
    Ok(())
}

#[tokio::test]
async fn fetch_join_loads_the_association() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    fixture.session.flush().await?;
    fixture.session.clear();

    let found = fixture
        .factory
        .select_from::<Member>(&member())
        .join(&member().get("team"), &team())
        .fetch_join()
        .where_(member().get("username").expr().eq("member1"))
        .fetch_one(&mut fixture.session)
        .await?;
    let found = found.expect("member1 exists");

    assert!(found.team.is_loaded());
    assert_eq!(found.team.get().map(|team| team.name.as_str()), Some("teamA"));
    Ok(())
}

#[tokio::test]
async fn fetch_join_after_a_plain_read_loads_the_association() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    fixture.session.clear();
    let member1 = member().get("username").expr().eq("member1");

    let plain = fixture
        .factory
        .select_from::<Member>(&member())
        .where_(member1.clone())
        .fetch_one(&mut fixture.session)
        .await?
        .expect("member1 exists");
    let fetched = fixture
        .factory
        .select_from::<Member>(&member())
        .join(&member().get("team"), &team())
        .fetch_join()
        .where_(member1)
        .fetch_one(&mut fixture.session)
        .await?
        .expect("member1 exists");

    assert!(!plain.team.is_loaded());
    assert_eq!(fetched.team.get().map(|team| team.name.as_str()), Some("teamA"));
    Ok(())
}

#[tokio::test]
async fn subquery_equal_to_the_maximum() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let oldest = select([member_sub().get("age").expr().max()]).from(&member_sub());

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .where_(member().get("age").expr().eq(oldest))
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(ages(&result), vec![70]);
    Ok(())
}

#[tokio::test]
async fn subquery_at_least_the_average() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let average = select([member_sub().get("age").expr().avg()]).from(&member_sub());

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .where_(member().get("age").expr().goe(average))
        .order_by([member().get("age").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(ages(&result), vec![40, 50, 60, 70]);
    Ok(())
}

#[tokio::test]
async fn subquery_in() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let age = member_sub().get("age").expr();
    let older = select([&age]).from(&member_sub()).where_(age.gt(50));

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .where_(member().get("age").expr().in_query(older))
        .order_by([member().get("age").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(ages(&result), vec![60, 70]);
    Ok(())
}

#[tokio::test]
async fn subquery_in_the_select_list() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let username = member().get("username").expr();
    let average =
        Expression::from(select([member_sub().get("age").expr().avg()]).from(&member_sub()));

    let result = fixture
        .factory
        .select(Projections::tuple([&username, &average]))
        .from(&member())
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(result.len(), 7);
    for tuple in &result {
        assert!((tuple.get_as::<f64>(&average)? - 40.0).abs() < f64::EPSILON);
    }
    Ok(())
}

#[tokio::test]
async fn correlated_subquery_per_team() -> anyhow::Result<()> {
    let mut fixture = fixture().await?;
    let oldest_in_team = select([member_sub().get("age").expr().max()])
        .from(&member_sub())
        .where_(member_sub().get("team").expr().eq(member().get("team")));

    let result = fixture
        .factory
        .select_from::<Member>(&member())
        .where_(member().get("age").expr().eq(oldest_in_team))
        .order_by([member().get("age").expr().asc()])
        .fetch(&mut fixture.session)
        .await?;

    assert_eq!(ages(&result), vec![20, 70]);
    Ok(())
}
