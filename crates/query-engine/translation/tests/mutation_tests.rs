mod common;

use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::mutation;
use querydsl_models::{
    DeleteDescriptor, EntityPath, InsertDescriptor, KeyedUpdateDescriptor, UpdateDescriptor,
    Value,
};

fn member() -> EntityPath {
    EntityPath::new("Member", "member")
}

#[tokio::test]
async fn bulk_update_refers_to_current_values() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let age = member().get("age").expr();
    let update = UpdateDescriptor::new(&member())
        .set(&age, age.add(1))
        .where_(age.lt(40));

    let sql = mutation::translate_update(&metadata, &update)?.query.query_sql();

    assert_eq!(
        sql.sql,
        r#"UPDATE "member" SET "age" = ("member"."age" + $1) WHERE ("member"."age" < $2)"#
    );
    insta::assert_snapshot!(common::numbered_params(&sql), @"[(1, Int8(1)), (2, Int8(40))]");
    Ok(())
}

#[tokio::test]
async fn assignments_keep_their_order() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let update = UpdateDescriptor::new(&member())
        .set(&member().get("username").expr(), "renamed")
        .set_null(&member().get("team").expr());

    let sql = mutation::translate_update(&metadata, &update)?.query.query_sql();

    assert_eq!(
        sql.sql,
        r#"UPDATE "member" SET "username" = $1, "team_id" = $2"#
    );
    Ok(())
}

#[tokio::test]
async fn mutations_refer_to_the_table_whatever_the_alias() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let m = EntityPath::new("Member", "m");
    let delete = DeleteDescriptor::new(&m).where_(m.get("age").expr().gt(18));

    let sql = mutation::translate_delete(&metadata, &delete)?.query.query_sql();

    assert_eq!(sql.sql, r#"DELETE FROM "member" WHERE ("member"."age" > $1)"#);
    Ok(())
}

#[tokio::test]
async fn delete_without_predicate_deletes_everything() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let sql = mutation::translate_delete(&metadata, &DeleteDescriptor::new(&member()))?
        .query
        .query_sql();

    assert_eq!(sql.sql, r#"DELETE FROM "member""#);
    Ok(())
}

#[tokio::test]
async fn pretty_printed_mutations_list_their_parameters() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let delete = DeleteDescriptor::new(&member()).where_(member().get("age").expr().gt(18));

    let pretty = common::pretty(&mutation::translate_delete(&metadata, &delete)?.query.query_sql());

    assert!(pretty.starts_with("DELETE"));
    assert!(pretty.ends_with("[(1, Int8(18))]"));
    Ok(())
}

#[tokio::test]
async fn insert_maps_attributes_to_columns() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let insert = InsertDescriptor {
        entity: "Member".to_string(),
        values: vec![
            ("username".to_string(), Value::from("member1")),
            ("age".to_string(), Value::Integer(10)),
            ("team".to_string(), Value::Integer(1)),
        ],
    };

    let sql = mutation::translate_insert(&metadata, &insert)?.query.query_sql();

    assert_eq!(
        sql.sql,
        r#"INSERT INTO "member" ("username", "age", "team_id") VALUES ($1, $2, $3)"#
    );
    Ok(())
}

#[tokio::test]
async fn keyed_update_targets_one_row() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let update = KeyedUpdateDescriptor {
        entity: "Member".to_string(),
        key: 3,
        values: vec![("age".to_string(), Value::Integer(31))],
    };

    let sql = mutation::translate_keyed_update(&metadata, &update)?
        .query
        .query_sql();

    assert_eq!(
        sql.sql,
        r#"UPDATE "member" SET "age" = $1 WHERE ("member"."member_id" = $2)"#
    );
    insta::assert_snapshot!(common::numbered_params(&sql), @"[(1, Int8(31)), (2, Int8(3))]");
    Ok(())
}

#[tokio::test]
async fn invalid_updates_are_rejected() -> anyhow::Result<()> {
    let metadata = common::member_metadata().await?;
    let team = EntityPath::new("Team", "team");

    assert_eq!(
        mutation::translate_update(&metadata, &UpdateDescriptor::new(&member())),
        Err(Error::NoAssignments)
    );
    assert_eq!(
        mutation::translate_update(
            &metadata,
            &UpdateDescriptor::new(&member()).set(&team.get("name").expr(), "teamC"),
        ),
        Err(Error::InvalidAssignmentTarget("team.name".to_string()))
    );
    assert_eq!(
        mutation::translate_update(
            &metadata,
            &UpdateDescriptor::new(&member()).set(&member().get("email").expr(), "x"),
        ),
        Err(Error::AttributeNotFound {
            entity: "Member".to_string(),
            attribute: "email".to_string(),
        })
    );
    Ok(())
}
