mod common;

use indexmap::IndexMap;
use query_engine_execution::error::{Error, QueryError};
use query_engine_translation::translation::{mutation, query};
use querydsl_models::{
    select, Association, DeleteDescriptor, EntityPath, EntityRecord, InsertDescriptor,
    KeyedUpdateDescriptor, ResultItem, ResultRow, UpdateDescriptor, Value,
};

fn member() -> EntityPath {
    EntityPath::new("Member", "member")
}

fn team() -> EntityPath {
    EntityPath::new("Team", "team")
}

fn entity(row: &ResultRow) -> &EntityRecord {
    match &row.0[0] {
        ResultItem::Entity(Some(record)) => record,
        other => panic!("expected an entity, found {other:?}"),
    }
}

fn scalar(row: &ResultRow) -> &Value {
    match &row.0[0] {
        ResultItem::Scalar(value) => value,
        other => panic!("expected a scalar, found {other:?}"),
    }
}

#[tokio::test]
async fn entities_are_decoded_with_their_foreign_keys() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let plan = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .order_by([member().get("age").expr().asc()]),
    )?;

    let rows = fixture.session.fetch(&plan).await?;

    assert_eq!(rows.len(), 7);
    let first = entity(&rows[0]);
    assert_eq!(first.key, 1);
    assert_eq!(first.attribute("username"), Some(&Value::from("member1")));
    assert_eq!(first.attribute("age"), Some(&Value::Integer(10)));
    assert_eq!(
        first.association("team"),
        Some(&Association::Unloaded {
            entity: "Team".to_string(),
            key: 1
        })
    );
    assert_eq!(entity(&rows[4]).attribute("username"), Some(&Value::Null));
    assert_eq!(fixture.session.managed(), 7);
    assert_eq!(fixture.session.metrics().query_total.get(), 1);
    Ok(())
}

#[tokio::test]
async fn aggregates_decode_to_their_inferred_types() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let age = member().get("age").expr();
    let plan = query::translate(
        &fixture.metadata,
        &select([age.count(), age.sum(), age.avg(), age.max(), age.min()]).from(&member()),
    )?;

    let rows = fixture.session.fetch(&plan).await?;

    similar_asserts::assert_eq!(
        rows,
        vec![ResultRow(vec![
            ResultItem::Scalar(Value::Integer(7)),
            ResultItem::Scalar(Value::Integer(280)),
            ResultItem::Scalar(Value::Real(40.0)),
            ResultItem::Scalar(Value::Integer(70)),
            ResultItem::Scalar(Value::Integer(10)),
        ])]
    );
    Ok(())
}

#[tokio::test]
async fn bulk_updates_leave_managed_snapshots_stale() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let age = member().get("age").expr();
    let members = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .where_(age.lt(50))
            .order_by([age.asc()]),
    )?;
    let update = mutation::translate_update(
        &fixture.metadata,
        &UpdateDescriptor::new(&member())
            .set(&member().get("username").expr(), "X")
            .where_(age.lt(50)),
    )?;

    fixture.session.fetch(&members).await?;
    let affected = fixture.session.execute(&update).await?;
    assert_eq!(affected, 4);

    let stale = fixture.session.fetch(&members).await?;
    assert_eq!(
        entity(&stale[0]).attribute("username"),
        Some(&Value::from("member1"))
    );

    let usernames = query::translate(
        &fixture.metadata,
        &select([member().get("username")])
            .from(&member())
            .where_(age.eq(10)),
    )?;
    let fresh_scalar = fixture.session.fetch(&usernames).await?;
    assert_eq!(scalar(&fresh_scalar[0]), &Value::from("X"));

    fixture.session.clear();
    let fresh = fixture.session.fetch(&members).await?;
    assert_eq!(entity(&fresh[0]).attribute("username"), Some(&Value::from("X")));
    assert_eq!(fixture.session.metrics().rows_affected_total.get(), 4);
    assert_eq!(fixture.session.metrics().mutation_total.get(), 1);
    Ok(())
}

#[tokio::test]
async fn fetch_joins_load_the_association() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let team_path = member().get("team");
    let fetch_joined = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .join(&team_path, &team())
            .fetch_join()
            .where_(member().get("username").expr().eq("member1")),
    )?;
    let joined = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .join(&team_path, &team())
            .where_(member().get("username").expr().eq("member1")),
    )?;

    let rows = fixture.session.fetch(&fetch_joined).await?;
    let Some(Association::Loaded(loaded)) = entity(&rows[0]).association("team") else {
        panic!("team should be loaded");
    };
    assert_eq!(loaded.attribute("name"), Some(&Value::from("teamA")));

    fixture.session.clear();
    let rows = fixture.session.fetch(&joined).await?;
    assert!(!entity(&rows[0]).association("team").is_some_and(Association::is_loaded));
    assert!(!fixture.session.contains("Team", 1));
    Ok(())
}

#[tokio::test]
async fn fetch_join_loads_the_association_of_a_managed_owner() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let member1 = member().get("username").expr().eq("member1");
    let plain = query::translate(
        &fixture.metadata,
        &select([&member()]).from(&member()).where_(member1.clone()),
    )?;
    let fetch_joined = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .join(&member().get("team"), &team())
            .fetch_join()
            .where_(member1),
    )?;

    let rows = fixture.session.fetch(&plain).await?;
    assert!(!entity(&rows[0]).association("team").is_some_and(Association::is_loaded));

    let rows = fixture.session.fetch(&fetch_joined).await?;
    let Some(Association::Loaded(loaded)) = entity(&rows[0]).association("team") else {
        panic!("team should be loaded");
    };
    assert_eq!(loaded.attribute("name"), Some(&Value::from("teamA")));
    assert!(fixture.session.contains("Team", 1));
    assert!(fixture
        .session
        .get("Member", 1)
        .and_then(|managed| managed.association("team"))
        .is_some_and(Association::is_loaded));
    Ok(())
}

#[tokio::test]
async fn associations_to_managed_entities_are_loaded() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let teams = query::translate(&fixture.metadata, &select([&team()]).from(&team()))?;
    let members = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .where_(member().get("age").expr().eq(30)),
    )?;

    fixture.session.fetch(&teams).await?;
    let rows = fixture.session.fetch(&members).await?;

    let Some(Association::Loaded(loaded)) = entity(&rows[0]).association("team") else {
        panic!("team should be loaded");
    };
    assert_eq!(loaded.attribute("name"), Some(&Value::from("teamB")));
    Ok(())
}

#[tokio::test]
async fn merged_snapshots_are_written_on_flush() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let insert = mutation::translate_insert(
        &fixture.metadata,
        &InsertDescriptor {
            entity: "Team".to_string(),
            values: vec![("name".to_string(), Value::from("teamC"))],
        },
    )?;

    let key = fixture.session.insert(&insert).await?;
    assert_eq!(key, 3);

    let update = mutation::translate_keyed_update(
        &fixture.metadata,
        &KeyedUpdateDescriptor {
            entity: "Team".to_string(),
            key,
            values: vec![("name".to_string(), Value::from("teamD"))],
        },
    )?;
    let record = EntityRecord {
        entity: "Team".to_string(),
        key,
        attributes: IndexMap::from([
            ("id".to_string(), Value::Integer(key)),
            ("name".to_string(), Value::from("teamD")),
        ]),
        associations: IndexMap::new(),
    };
    fixture.session.merge(record, update);
    assert_eq!(fixture.session.pending(), 1);
    assert_eq!(
        fixture.session.get("Team", key).and_then(|team| team.attribute("name")),
        Some(&Value::from("teamD"))
    );

    let names = query::translate(
        &fixture.metadata,
        &select([team().get("name")])
            .from(&team())
            .where_(team().get("id").expr().eq(key)),
    )?;
    let rows = fixture.session.fetch(&names).await?;

    assert_eq!(fixture.session.pending(), 0);
    assert_eq!(scalar(&rows[0]), &Value::from("teamD"));
    Ok(())
}

#[tokio::test]
async fn insert_rejects_other_mutations() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let delete = mutation::translate_delete(&fixture.metadata, &DeleteDescriptor::new(&team()))?;

    let result = fixture.session.insert(&delete).await;

    assert!(matches!(
        result,
        Err(Error::Query(QueryError::UnexpectedMutation("insert")))
    ));
    Ok(())
}

#[tokio::test]
async fn explain_reports_the_plan() -> anyhow::Result<()> {
    let mut fixture = common::fixture().await?;
    let plan = query::translate(
        &fixture.metadata,
        &select([&member()])
            .from(&member())
            .where_(member().get("age").expr().gt(10)),
    )?;

    let (pretty, details) = fixture.session.explain(&plan).await?;

    assert!(pretty.starts_with("SELECT"), "{pretty}");
    assert!(details.contains("member"), "{details}");
    Ok(())
}
