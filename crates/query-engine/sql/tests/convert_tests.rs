use query_engine_sql::sql::ast::*;
use query_engine_sql::sql::helpers;
use query_engine_sql::sql::string::{Param, SQL};

fn member_age() -> Expression {
    Expression::ColumnReference(ColumnReference::TableColumn {
        table: TableReference::AliasedTable(helpers::make_table_alias("member".to_string())),
        name: ColumnName("age".to_string()),
    })
}

fn member_from() -> From {
    From::Table {
        reference: helpers::db_table("member"),
        alias: helpers::make_table_alias("member".to_string()),
    }
}

#[test]
fn select_with_paging_and_null_ordering() {
    let mut select = helpers::simple_select(vec![(
        helpers::make_column_alias("c0".to_string()),
        member_age(),
    )]);
    select.from = Some(member_from());
    select.where_ = Where(Expression::BinaryOperation {
        left: Box::new(member_age()),
        operator: BinaryOperator(">".to_string()),
        right: Box::new(Expression::Value(Value::Int8(10))),
    });
    select.order_by = OrderBy {
        elements: vec![OrderByElement {
            target: member_age(),
            direction: OrderByDirection::Desc,
            nulls: Some(NullsOrder::Last),
        }],
    };
    select.limit = Limit {
        limit: Some(2),
        offset: Some(1),
    };

    let mut sql = SQL::new();
    select.to_sql(&mut sql);

    similar_asserts::assert_eq!(
        sql,
        SQL {
            sql: r#"SELECT "member"."age" AS "c0" FROM "member" AS "member" WHERE ("member"."age" > $1) ORDER BY "member"."age" DESC NULLS LAST LIMIT 2 OFFSET 1"#
                .to_string(),
            params: vec![Param::Int8(10)],
            param_index: 1,
        }
    );
}

#[test]
fn offset_without_limit_still_renders_a_limit() {
    let mut select = helpers::star_select(member_from());
    select.limit = Limit {
        limit: None,
        offset: Some(3),
    };

    let mut sql = SQL::new();
    select.to_sql(&mut sql);

    assert_eq!(
        sql.sql,
        r#"SELECT * FROM "member" AS "member" LIMIT -1 OFFSET 3"#
    );
}

#[test]
fn paging_beyond_the_signed_range_is_clamped() {
    let mut select = helpers::star_select(member_from());
    select.limit = Limit {
        limit: Some(u64::MAX),
        offset: Some(u64::MAX),
    };

    let mut sql = SQL::new();
    select.to_sql(&mut sql);

    assert_eq!(
        sql.sql,
        r#"SELECT * FROM "member" AS "member" LIMIT 9223372036854775807 OFFSET 9223372036854775807"#
    );
}

#[test]
fn count_select_wraps_the_query() {
    let mut inner = helpers::star_select(member_from());
    inner.group_by = GroupBy {
        elements: vec![member_age()],
    };

    let mut sql = SQL::new();
    helpers::count_select(inner).to_sql(&mut sql);

    assert_eq!(
        sql.sql,
        r#"SELECT COUNT(*) AS "count" FROM (SELECT * FROM "member" AS "member" GROUP BY "member"."age") AS "counted""#
    );
}

#[test]
fn update_assignments_keep_their_order() {
    let update = Update {
        table: TableName("member".to_string()),
        set: vec![
            (
                ColumnName("username".to_string()),
                Expression::Value(Value::String("x".to_string())),
            ),
            (
                ColumnName("age".to_string()),
                Expression::Value(Value::Null),
            ),
        ],
        where_: Where(helpers::empty_where()),
    };

    let mut sql = SQL::new();
    update.to_sql(&mut sql);

    assert_eq!(sql.sql, r#"UPDATE "member" SET "username" = $1, "age" = $2"#);
    assert_eq!(
        sql.params,
        vec![Param::String("x".to_string()), Param::Null]
    );
}

#[test]
fn raw_sql_interleaves_parameters() {
    let expression = Expression::RawSql(vec![
        RawSql::RawText("replace(".to_string()),
        RawSql::Expression(member_age()),
        RawSql::RawText(", ".to_string()),
        RawSql::Expression(Expression::Value(Value::String("a".to_string()))),
        RawSql::RawText(")".to_string()),
    ]);

    let mut sql = SQL::new();
    expression.to_sql(&mut sql);

    assert_eq!(sql.sql, r#"replace("member"."age", $1)"#);
}
