//! Null-safe predicate combination.
//!
//! An absent predicate (`None`) means "no constraint". Combining treats it as the
//! identity, so optional search conditions can be chained without checking each one.

use crate::expression::Expression;

/// `left AND right`, where an absent side is dropped.
pub fn and(left: Option<Expression>, right: Option<Expression>) -> Option<Expression> {
    match (left, right) {
        (Some(left), Some(right)) => Some(Expression::And(Box::new(left), Box::new(right))),
        (Some(one), None) | (None, Some(one)) => Some(one),
        (None, None) => None,
    }
}

/// `left OR right`, where an absent side is dropped.
pub fn or(left: Option<Expression>, right: Option<Expression>) -> Option<Expression> {
    match (left, right) {
        (Some(left), Some(right)) => Some(Expression::Or(Box::new(left), Box::new(right))),
        (Some(one), None) | (None, Some(one)) => Some(one),
        (None, None) => None,
    }
}

/// Conjunction of every present predicate; `None` when all are absent.
pub fn all<I>(predicates: I) -> Option<Expression>
where
    I: IntoIterator<Item = Option<Expression>>,
{
    predicates.into_iter().fold(None, and)
}

/// Disjunction of every present predicate; `None` when all are absent.
pub fn any<I>(predicates: I) -> Option<Expression>
where
    I: IntoIterator<Item = Option<Expression>>,
{
    predicates.into_iter().fold(None, or)
}

/// A mutable accumulator of predicates. An empty builder filters nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateBuilder {
    predicate: Option<Expression>,
}

impl PredicateBuilder {
    pub fn new() -> PredicateBuilder {
        PredicateBuilder::default()
    }

    pub fn and(&mut self, predicate: impl Into<Option<Expression>>) -> &mut Self {
        self.predicate = and(self.predicate.take(), predicate.into());
        self
    }

    pub fn or(&mut self, predicate: impl Into<Option<Expression>>) -> &mut Self {
        self.predicate = or(self.predicate.take(), predicate.into());
        self
    }

    pub fn has_value(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn value(&self) -> Option<&Expression> {
        self.predicate.as_ref()
    }

    pub fn build(self) -> Option<Expression> {
        self.predicate
    }
}

impl From<PredicateBuilder> for Option<Expression> {
    fn from(builder: PredicateBuilder) -> Self {
        builder.predicate
    }
}

impl From<&PredicateBuilder> for Option<Expression> {
    fn from(builder: &PredicateBuilder) -> Self {
        builder.predicate.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::EntityPath;

    fn username_eq(username: Option<&str>) -> Option<Expression> {
        username.map(|u| EntityPath::new("Member", "member").get("username").expr().eq(u))
    }

    fn age_eq(age: Option<i64>) -> Option<Expression> {
        age.map(|a| EntityPath::new("Member", "member").get("age").expr().eq(a))
    }

    #[test]
    fn absent_predicates_are_the_identity() {
        assert_eq!(and(None, None), None);
        assert_eq!(and(username_eq(Some("a")), None), username_eq(Some("a")));
        assert_eq!(or(None, age_eq(Some(3))), age_eq(Some(3)));
        assert_eq!(all([None, None, None]), None);
    }

    #[test]
    fn chaining_from_an_absent_predicate_does_not_fail() {
        let combined = and(username_eq(None), age_eq(Some(10)));
        assert_eq!(combined, age_eq(Some(10)));
    }

    #[test]
    fn builder_and_functions_agree() {
        let mut builder = PredicateBuilder::new();
        builder.and(username_eq(Some("member1"))).and(age_eq(Some(10)));
        assert!(builder.has_value());
        assert_eq!(
            builder.value(),
            all([username_eq(Some("member1")), age_eq(Some(10))]).as_ref()
        );
        assert_eq!(
            builder.build(),
            all([username_eq(Some("member1")), age_eq(Some(10))])
        );
    }

    #[test]
    fn empty_builder_has_no_value() {
        let builder = PredicateBuilder::new();
        assert!(!builder.has_value());
        assert_eq!(Option::<Expression>::from(builder), None);
    }
}
