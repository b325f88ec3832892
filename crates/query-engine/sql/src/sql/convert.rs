//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::helpers;
use super::string::*;

/// Render items separated by commas.
fn comma_separated<T>(items: &[T], sql: &mut SQL, to_sql: impl Fn(&T, &mut SQL)) {
    for (index, item) in items.iter().enumerate() {
        to_sql(item, sql);
        if index < (items.len() - 1) {
            sql.append_syntax(", ");
        }
    }
}

// Convert to SQL strings

impl Explain<'_> {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("EXPLAIN QUERY PLAN ");
        match self {
            Explain::Select(select) => select.to_sql(sql),
        }
    }
}

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            SelectList::SelectList(select_list) => {
                comma_separated(select_list, sql, |(col, expr), sql| {
                    expr.to_sql(sql);
                    sql.append_syntax(" AS ");
                    col.to_sql(sql);
                });
            }
            SelectList::SelectStar => {
                sql.append_syntax("*");
            }
        }
    }
}

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        if let Some(from) = &self.from {
            sql.append_syntax(" FROM ");
            from.to_sql(sql);
        }

        for join in &self.joins {
            join.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.group_by.to_sql(sql);

        self.having.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);
    }
}

impl Insert {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("INSERT INTO ");
        self.table.to_sql(sql);
        if self.columns.is_empty() {
            sql.append_syntax(" DEFAULT VALUES");
            return;
        }
        sql.append_syntax(" (");
        comma_separated(&self.columns, sql, ColumnName::to_sql);
        sql.append_syntax(") VALUES (");
        comma_separated(&self.values, sql, Expression::to_sql);
        sql.append_syntax(")");
    }
}

impl Update {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("UPDATE ");
        self.table.to_sql(sql);
        sql.append_syntax(" SET ");
        comma_separated(&self.set, sql, |(column, value), sql| {
            column.to_sql(sql);
            sql.append_syntax(" = ");
            value.to_sql(sql);
        });
        self.where_.to_sql(sql);
    }
}

impl Delete {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("DELETE FROM ");
        self.table.to_sql(sql);
        self.where_.to_sql(sql);
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            From::Table { reference, alias } => {
                reference.to_sql(sql);
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
            From::Select { select, alias } => {
                sql.append_syntax("(");
                select.to_sql(sql);
                sql.append_syntax(")");
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl Join {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Join::InnerJoin(join) => {
                sql.append_syntax(" INNER JOIN ");
                join.relation.to_sql(sql);
                sql.append_syntax(" ON ");
                join.on.to_sql(sql);
            }
            Join::LeftOuterJoin(join) => {
                sql.append_syntax(" LEFT OUTER JOIN ");
                join.relation.to_sql(sql);
                sql.append_syntax(" ON ");
                join.on.to_sql(sql);
            }
            Join::CrossJoin(join) => {
                sql.append_syntax(" CROSS JOIN ");
                join.relation.to_sql(sql);
            }
        }
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Where(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

impl GroupBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" GROUP BY ");
            comma_separated(&self.elements, sql, Expression::to_sql);
        }
    }
}

impl Having {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Having(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" HAVING ");
            expression.to_sql(sql);
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => value.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Or { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" OR ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Not(expr) => {
                sql.append_syntax("NOT ");
                expr.to_sql(sql);
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryArrayOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                {
                    left.to_sql(sql);
                    operator.to_sql(sql);
                    sql.append_syntax("(");
                    comma_separated(right, sql, Expression::to_sql);
                    sql.append_syntax(")");
                }
                sql.append_syntax(")");
            }
            Expression::BinarySubSelectOperation {
                left,
                operator,
                select,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax("(");
                select.to_sql(sql);
                sql.append_syntax("))");
            }
            Expression::UnaryOperation {
                expression,
                operator,
            } => {
                sql.append_syntax("(");
                expression.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::FunctionCall { function, args } => {
                function.to_sql(sql);
                sql.append_syntax("(");
                comma_separated(args, sql, Expression::to_sql);
                sql.append_syntax(")");
            }
            Expression::Count(count_type) => {
                sql.append_syntax("COUNT");
                sql.append_syntax("(");
                count_type.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::CorrelatedSubSelect(select) => {
                sql.append_syntax("(");
                select.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::RawSql(items) => {
                for item in items {
                    item.to_sql(sql);
                }
            }
        }
    }
}

impl RawSql {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            RawSql::RawText(text) => sql.append_syntax(text),
            RawSql::Expression(expression) => expression.to_sql(sql),
        }
    }
}

impl UnaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            UnaryOperator::IsNull => sql.append_syntax(" IS NULL"),
            UnaryOperator::IsNotNull => sql.append_syntax(" IS NOT NULL"),
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax(" ");
        sql.append_syntax(&self.0);
        sql.append_syntax(" ");
    }
}

impl BinaryArrayOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            BinaryArrayOperator::In => sql.append_syntax(" IN "),
        }
    }
}

impl Function {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Function::Coalesce => sql.append_syntax("coalesce"),
            Function::Upper => sql.append_syntax("upper"),
            Function::Lower => sql.append_syntax("lower"),
            Function::Length => sql.append_syntax("length"),
            Function::Sum => sql.append_syntax("SUM"),
            Function::Avg => sql.append_syntax("AVG"),
            Function::Max => sql.append_syntax("MAX"),
            Function::Min => sql.append_syntax("MIN"),
            Function::Unknown(name) => sql.append_syntax(name),
        }
    }
}

impl CountType {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            CountType::Star => sql.append_syntax("*"),
            CountType::Simple(expression) => expression.to_sql(sql),
            CountType::Distinct(expression) => {
                sql.append_syntax("DISTINCT ");
                expression.to_sql(sql);
            }
        }
    }
}

impl Value {
    /// Every value is bound as a parameter.
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Value::Int8(i) => sql.append_param(Param::Int8(*i)),
            Value::Float8(f) => sql.append_param(Param::Float8(*f)),
            Value::String(s) => sql.append_param(Param::String(s.clone())),
            Value::Bool(b) => sql.append_param(Param::Bool(*b)),
            Value::Null => sql.append_param(Param::Null),
        }
    }
}

/// SQLite reads LIMIT and OFFSET as signed 64 bit integers. Larger values select the same
/// rows as `i64::MAX` does.
fn sqlite_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Limit {
    pub fn to_sql(&self, sql: &mut SQL) {
        match (self.limit, self.offset) {
            (None, None) => (),
            (Some(limit), _) => {
                sql.append_syntax(" LIMIT ");
                sql.append_syntax(sqlite_integer(limit).to_string().as_str());
            }
            // SQLite has no OFFSET without LIMIT.
            (None, Some(_)) => sql.append_syntax(" LIMIT -1"),
        };
        if let Some(offset) = self.offset {
            sql.append_syntax(" OFFSET ");
            sql.append_syntax(sqlite_integer(offset).to_string().as_str());
        }
    }
}

// names
impl TableName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl TableReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            TableReference::DBTable { table } => table.to_sql(sql),
            TableReference::AliasedTable(alias) => alias.to_sql(sql),
        };
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            ColumnReference::TableColumn { table, name } => {
                table.to_sql(sql);
                sql.append_syntax(".");
                name.to_sql(sql);
            }
            ColumnReference::AliasedColumn { table, column } => {
                table.to_sql(sql);
                sql.append_syntax(".");
                column.to_sql(sql);
            }
        };
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            comma_separated(&self.elements, sql, OrderByElement::to_sql);
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
        match self.nulls {
            None => (),
            Some(NullsOrder::First) => sql.append_syntax(" NULLS FIRST"),
            Some(NullsOrder::Last) => sql.append_syntax(" NULLS LAST"),
        }
    }
}

impl OrderByDirection {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}
