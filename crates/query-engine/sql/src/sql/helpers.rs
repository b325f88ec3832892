//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

/// The alias of the derived table a count query counts over.
pub const COUNTED_TABLE_ALIAS: &str = "counted";

/// The alias of the single column of a count query.
pub const COUNT_COLUMN_ALIAS: &str = "count";

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// An empty `GROUP BY` clause.
pub fn empty_group_by() -> GroupBy {
    GroupBy { elements: vec![] }
}

/// An empty `HAVING` clause.
pub fn empty_having() -> Having {
    Having(true_expr())
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// `left AND right`, skipping a `true` operand.
pub fn and(left: Expression, right: Expression) -> Expression {
    if left == true_expr() {
        right
    } else if right == true_expr() {
        left
    } else {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// Aliasing //

/// Generate a column expression refering to a specific table.
pub fn make_column(
    table: TableReference,
    name: ColumnName,
    alias: ColumnAlias,
) -> (ColumnAlias, Expression) {
    (
        alias,
        Expression::ColumnReference(ColumnReference::TableColumn { table, name }),
    )
}

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(name: String) -> TableAlias {
    TableAlias { name }
}

/// A reference to a table by its database name.
pub fn db_table(name: &str) -> TableReference {
    TableReference::DBTable {
        table: TableName(name.to_string()),
    }
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from: None,
        joins: vec![],
        where_: Where(empty_where()),
        group_by: empty_group_by(),
        having: empty_having(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Build a simple select *
pub fn star_select(from: From) -> Select {
    Select {
        select_list: SelectList::SelectStar,
        from: Some(from),
        joins: vec![],
        where_: Where(empty_where()),
        group_by: empty_group_by(),
        having: empty_having(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Count the rows a select returns: `SELECT COUNT(*) FROM (<select>) AS "counted"`.
pub fn count_select(select: Select) -> Select {
    let mut counted = simple_select(vec![(
        make_column_alias(COUNT_COLUMN_ALIAS.to_string()),
        Expression::Count(CountType::Star),
    )]);
    counted.from = Some(From::Select {
        select: Box::new(select),
        alias: make_table_alias(COUNTED_TABLE_ALIAS.to_string()),
    });
    counted
}
