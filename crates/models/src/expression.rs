//! The expression model.
//!
//! Expressions are trees of operators over paths, literals and subqueries. Every
//! builder method takes `&self` and returns a new node, so handles such as
//! `member.age` can be reused freely. Structural equality is what addresses a column
//! of a result tuple.

use crate::path::{EntityPath, Path};
use crate::query::{Direction, NullHandling, OrderSpecifier, QueryDescriptor};
use crate::value::Value;

/// A scalar or boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An attribute of an entity.
    Path(Path),
    /// A whole entity. Selecting it yields an entity record; anywhere else it stands for
    /// the entity's key.
    Entity(EntityPath),
    /// A column of an aliased subquery joined as a derived table.
    DerivedColumn { alias: String, column: String },
    /// A literal operand. Always bound as a parameter.
    Literal(Value),
    Comparison {
        left: Box<Expression>,
        operator: ComparisonOperator,
        right: Box<Expression>,
    },
    InList {
        expression: Box<Expression>,
        values: Vec<Expression>,
    },
    InSubQuery {
        expression: Box<Expression>,
        query: Box<QueryDescriptor>,
    },
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Function {
        function: Function,
        args: Vec<Expression>,
    },
    /// Raw SQL with `{n}` placeholders filled by the rendered arguments.
    Template {
        template: String,
        args: Vec<Expression>,
    },
    /// An aggregate. A missing argument means `COUNT(*)`.
    Aggregate {
        function: AggregateFunction,
        argument: Option<Box<Expression>>,
        distinct: bool,
    },
    /// A subquery returning a single value.
    SubQuery(Box<QueryDescriptor>),
    /// An expression under an explicit output name.
    Alias {
        expression: Box<Expression>,
        alias: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    NotLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    Upper,
    Lower,
    Length,
    Coalesce,
    /// Any other function of the backing store, called by name.
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Literal(value)
    }
}

impl From<&Expression> for Expression {
    fn from(expression: &Expression) -> Self {
        expression.clone()
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::Literal(value.into())
    }
}

impl From<QueryDescriptor> for Expression {
    fn from(query: QueryDescriptor) -> Self {
        Expression::SubQuery(Box::new(query))
    }
}

fn boxed(expression: impl Into<Expression>) -> Box<Expression> {
    Box::new(expression.into())
}

#[allow(clippy::should_implement_trait)]
impl Expression {
    pub fn literal(value: impl Into<Value>) -> Expression {
        Expression::Literal(value.into())
    }

    /// `COUNT(*)`
    pub fn count_all() -> Expression {
        Expression::Aggregate {
            function: AggregateFunction::Count,
            argument: None,
            distinct: false,
        }
    }

    fn compare(&self, operator: ComparisonOperator, right: impl Into<Expression>) -> Expression {
        Expression::Comparison {
            left: Box::new(self.clone()),
            operator,
            right: boxed(right),
        }
    }

    pub fn eq(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::Equal, right)
    }

    pub fn ne(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::NotEqual, right)
    }

    pub fn gt(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::GreaterThan, right)
    }

    pub fn goe(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::GreaterThanOrEqual, right)
    }

    pub fn lt(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::LessThan, right)
    }

    pub fn loe(&self, right: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::LessThanOrEqual, right)
    }

    /// A `LIKE` match. The pattern is passed through as-is: `%` and `_` are wildcards.
    pub fn like(&self, pattern: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::Like, pattern)
    }

    pub fn not_like(&self, pattern: impl Into<Expression>) -> Expression {
        self.compare(ComparisonOperator::NotLike, pattern)
    }

    pub fn is_null(&self) -> Expression {
        Expression::IsNull(Box::new(self.clone()))
    }

    pub fn is_not_null(&self) -> Expression {
        Expression::IsNotNull(Box::new(self.clone()))
    }

    pub fn in_list<I, V>(&self, values: I) -> Expression
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Expression::InList {
            expression: Box::new(self.clone()),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn in_query(&self, query: QueryDescriptor) -> Expression {
        Expression::InSubQuery {
            expression: Box::new(self.clone()),
            query: Box::new(query),
        }
    }

    pub fn between(&self, low: impl Into<Expression>, high: impl Into<Expression>) -> Expression {
        self.goe(low).and(self.loe(high))
    }

    pub fn and(&self, right: impl Into<Expression>) -> Expression {
        Expression::And(Box::new(self.clone()), boxed(right))
    }

    pub fn or(&self, right: impl Into<Expression>) -> Expression {
        Expression::Or(Box::new(self.clone()), boxed(right))
    }

    pub fn not(&self) -> Expression {
        Expression::Not(Box::new(self.clone()))
    }

    fn binary(&self, operator: BinaryOperator, right: impl Into<Expression>) -> Expression {
        Expression::Binary {
            left: Box::new(self.clone()),
            operator,
            right: boxed(right),
        }
    }

    pub fn add(&self, right: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Add, right)
    }

    pub fn subtract(&self, right: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Subtract, right)
    }

    pub fn multiply(&self, right: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Multiply, right)
    }

    pub fn divide(&self, right: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Divide, right)
    }

    pub fn concat(&self, right: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Concat, right)
    }

    pub fn upper(&self) -> Expression {
        function(Function::Upper, vec![self.clone()])
    }

    pub fn lower(&self) -> Expression {
        function(Function::Lower, vec![self.clone()])
    }

    pub fn length(&self) -> Expression {
        function(Function::Length, vec![self.clone()])
    }

    /// `COALESCE(self, fallback)`
    pub fn coalesce(&self, fallback: impl Into<Expression>) -> Expression {
        function(Function::Coalesce, vec![self.clone(), fallback.into()])
    }

    fn aggregate(&self, function: AggregateFunction, distinct: bool) -> Expression {
        Expression::Aggregate {
            function,
            argument: Some(Box::new(self.clone())),
            distinct,
        }
    }

    pub fn count(&self) -> Expression {
        self.aggregate(AggregateFunction::Count, false)
    }

    pub fn count_distinct(&self) -> Expression {
        self.aggregate(AggregateFunction::Count, true)
    }

    pub fn sum(&self) -> Expression {
        self.aggregate(AggregateFunction::Sum, false)
    }

    pub fn avg(&self) -> Expression {
        self.aggregate(AggregateFunction::Avg, false)
    }

    pub fn max(&self) -> Expression {
        self.aggregate(AggregateFunction::Max, false)
    }

    pub fn min(&self) -> Expression {
        self.aggregate(AggregateFunction::Min, false)
    }

    /// Give this expression an output name, used by projections to find the target field.
    pub fn as_(&self, alias: impl Into<String>) -> Expression {
        Expression::Alias {
            expression: Box::new(self.clone()),
            alias: alias.into(),
        }
    }

    pub fn asc(&self) -> OrderSpecifier {
        OrderSpecifier {
            target: self.clone(),
            direction: Direction::Asc,
            nulls: NullHandling::Default,
        }
    }

    pub fn desc(&self) -> OrderSpecifier {
        OrderSpecifier {
            target: self.clone(),
            direction: Direction::Desc,
            nulls: NullHandling::Default,
        }
    }

    /// The name a projection uses to match this expression with a destination field: the
    /// alias if one was given, otherwise the attribute of a path. Anything else is unnamed.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Expression::Alias { alias, .. } => Some(alias.as_str()),
            Expression::Path(path) => Some(path.attribute.as_str()),
            Expression::DerivedColumn { column, .. } => Some(column.as_str()),
            _ => None,
        }
    }

    /// Whether this expression contains an aggregate at this query level. Subqueries are
    /// their own level and are not inspected.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate { .. } => true,
            Expression::Path(_)
            | Expression::Entity(_)
            | Expression::DerivedColumn { .. }
            | Expression::Literal(_)
            | Expression::SubQuery(_) => false,
            Expression::Comparison { left, right, .. }
            | Expression::Binary { left, right, .. }
            | Expression::And(left, right)
            | Expression::Or(left, right) => left.contains_aggregate() || right.contains_aggregate(),
            Expression::InList { expression, values } => {
                expression.contains_aggregate() || values.iter().any(Expression::contains_aggregate)
            }
            Expression::InSubQuery { expression, .. }
            | Expression::IsNull(expression)
            | Expression::IsNotNull(expression)
            | Expression::Not(expression)
            | Expression::Alias { expression, .. } => expression.contains_aggregate(),
            Expression::Function { args, .. } | Expression::Template { args, .. } => {
                args.iter().any(Expression::contains_aggregate)
            }
        }
    }

    /// Strip any aliases to get at the underlying expression.
    pub fn unaliased(&self) -> &Expression {
        match self {
            Expression::Alias { expression, .. } => expression.unaliased(),
            other => other,
        }
    }
}

fn function(function: Function, args: Vec<Expression>) -> Expression {
    Expression::Function { function, args }
}

/// Call any function of the backing store by name.
pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Expression {
    function(Function::Named(name.into()), args)
}

/// A column of a subquery joined under `alias`.
pub fn column(alias: impl Into<String>, column: impl Into<String>) -> Expression {
    Expression::DerivedColumn {
        alias: alias.into(),
        column: column.into(),
    }
}

/// A raw SQL template such as `replace({0}, {1}, {2})`. Placeholders are replaced by the
/// rendered arguments; literal arguments are still bound as parameters.
pub fn template(template: impl Into<String>, args: Vec<Expression>) -> Expression {
    Expression::Template {
        template: template.into(),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> EntityPath {
        EntityPath::new("Member", "member")
    }

    #[test]
    fn builders_do_not_touch_their_operands() {
        let age = member().get("age").expr();
        let predicate = age.gt(18).and(age.lt(65));
        assert_eq!(age, member().get("age").expr());
        assert!(matches!(predicate, Expression::And(_, _)));
    }

    #[test]
    fn output_names() {
        let username = member().get("username").expr();
        assert_eq!(username.output_name(), Some("username"));
        assert_eq!(username.as_("name").output_name(), Some("name"));
        assert_eq!(member().get("age").expr().max().output_name(), None);
    }

    #[test]
    fn aggregates_inside_subqueries_do_not_count() {
        let sub = EntityPath::new("Member", "member_sub");
        let subquery = crate::query::select([sub.get("age").expr().avg()]).from(&sub);
        let outer = member().get("age").expr().goe(subquery);
        assert!(!outer.contains_aggregate());
        assert!(member().get("age").expr().sum().add(1).contains_aggregate());
    }
}
