//! Query descriptors.
//!
//! A [`QueryDescriptor`] records everything about a SELECT before it is translated. The
//! builder methods consume the descriptor and return its successor; once handed to
//! translation it is only ever read.

use crate::expression::Expression;
use crate::path::{EntityPath, Path};
use crate::predicate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub select: Vec<Expression>,
    pub from: Vec<EntityPath>,
    pub joins: Vec<JoinClause>,
    pub where_: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderSpecifier>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// `on`/`fetch_join` modifiers given before any join. Rejected at translation.
    pub unattached_modifiers: Vec<JoinModifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub target: JoinTarget,
    pub on: Option<Expression>,
    /// Materialize the joined association together with its owner.
    pub fetch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Cartesian,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    /// Follow an association; the foreign key predicate comes from the catalog.
    Association { path: Path, alias: EntityPath },
    /// An unrelated entity; correlation must come from `on` or the where clause.
    Entity(EntityPath),
    /// A derived table.
    SubQuery {
        query: Box<QueryDescriptor>,
        alias: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinModifier {
    On(Expression),
    FetchJoin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpecifier {
    pub target: Expression,
    pub direction: Direction,
    pub nulls: NullHandling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Where nulls sort, independent of the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullHandling {
    /// Whatever the backing store does.
    Default,
    NullsFirst,
    NullsLast,
}

impl OrderSpecifier {
    pub fn nulls_first(self) -> OrderSpecifier {
        OrderSpecifier {
            nulls: NullHandling::NullsFirst,
            ..self
        }
    }

    pub fn nulls_last(self) -> OrderSpecifier {
        OrderSpecifier {
            nulls: NullHandling::NullsLast,
            ..self
        }
    }
}

/// Start a (sub)query with a select list.
pub fn select<I, E>(items: I) -> QueryDescriptor
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    QueryDescriptor {
        select: items.into_iter().map(Into::into).collect(),
        ..QueryDescriptor::default()
    }
}

impl QueryDescriptor {
    pub fn new() -> QueryDescriptor {
        QueryDescriptor::default()
    }

    /// Add a source. Several sources without a join predicate form a cartesian product.
    #[must_use]
    pub fn from(mut self, source: &EntityPath) -> Self {
        self.from.push(source.clone());
        self
    }

    fn push_join(mut self, kind: JoinKind, target: JoinTarget) -> Self {
        self.joins.push(JoinClause {
            kind,
            target,
            on: None,
            fetch: false,
        });
        self
    }

    #[must_use]
    pub fn join(self, association: &Path, alias: &EntityPath) -> Self {
        self.push_join(
            JoinKind::Inner,
            JoinTarget::Association {
                path: association.clone(),
                alias: alias.clone(),
            },
        )
    }

    #[must_use]
    pub fn left_join(self, association: &Path, alias: &EntityPath) -> Self {
        self.push_join(
            JoinKind::Left,
            JoinTarget::Association {
                path: association.clone(),
                alias: alias.clone(),
            },
        )
    }

    /// Join an unrelated entity. Without `on` this is a cartesian product.
    #[must_use]
    pub fn join_entity(self, target: &EntityPath) -> Self {
        self.push_join(JoinKind::Inner, JoinTarget::Entity(target.clone()))
    }

    #[must_use]
    pub fn left_join_entity(self, target: &EntityPath) -> Self {
        self.push_join(JoinKind::Left, JoinTarget::Entity(target.clone()))
    }

    #[must_use]
    pub fn cross_join(self, target: &EntityPath) -> Self {
        self.push_join(JoinKind::Cartesian, JoinTarget::Entity(target.clone()))
    }

    #[must_use]
    pub fn join_subquery(self, query: QueryDescriptor, alias: impl Into<String>) -> Self {
        self.push_join(
            JoinKind::Inner,
            JoinTarget::SubQuery {
                query: Box::new(query),
                alias: alias.into(),
            },
        )
    }

    #[must_use]
    pub fn left_join_subquery(self, query: QueryDescriptor, alias: impl Into<String>) -> Self {
        self.push_join(
            JoinKind::Left,
            JoinTarget::SubQuery {
                query: Box::new(query),
                alias: alias.into(),
            },
        )
    }

    /// Add a condition to the most recent join.
    #[must_use]
    pub fn on(mut self, condition: Expression) -> Self {
        match self.joins.last_mut() {
            Some(join) => join.on = predicate::and(join.on.take(), Some(condition)),
            None => self
                .unattached_modifiers
                .push(JoinModifier::On(condition)),
        }
        self
    }

    /// Load the association of the most recent join in the same round trip.
    #[must_use]
    pub fn fetch_join(mut self) -> Self {
        match self.joins.last_mut() {
            Some(join) => join.fetch = true,
            None => self.unattached_modifiers.push(JoinModifier::FetchJoin),
        }
        self
    }

    /// AND a predicate into the where clause. `None` adds nothing.
    #[must_use]
    pub fn where_(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.where_ = predicate::and(self.where_.take(), condition.into());
        self
    }

    /// AND every present predicate into the where clause, dropping absent ones.
    #[must_use]
    pub fn where_all<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Expression>>,
    {
        self.where_ = predicate::and(self.where_.take(), predicate::all(conditions));
        self
    }

    #[must_use]
    pub fn group_by<I, E>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.group_by.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn having(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.having = predicate::and(self.having.take(), condition.into());
        self
    }

    #[must_use]
    pub fn order_by<I>(mut self, specifiers: I) -> Self
    where
        I: IntoIterator<Item = OrderSpecifier>,
    {
        self.order_by.extend(specifiers);
        self
    }

    /// Zero-based index of the first row.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The same query without paging or ordering, as used to count every matching row.
    #[must_use]
    pub fn without_paging(&self) -> QueryDescriptor {
        QueryDescriptor {
            order_by: vec![],
            offset: None,
            limit: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_applies_to_the_last_join() {
        let member = EntityPath::new("Member", "member");
        let team = EntityPath::new("Team", "team");
        let query = select([member.expr()])
            .from(&member)
            .left_join(&member.get("team"), &team)
            .on(team.get("name").expr().eq("teamA"));

        assert_eq!(query.joins.len(), 1);
        assert_eq!(query.joins[0].on, Some(team.get("name").expr().eq("teamA")));
        assert!(query.unattached_modifiers.is_empty());
    }

    #[test]
    fn on_without_a_join_is_kept_for_translation_to_reject() {
        let member = EntityPath::new("Member", "member");
        let query = select([member.expr()])
            .from(&member)
            .on(member.get("age").expr().eq(1))
            .fetch_join();
        assert_eq!(query.unattached_modifiers.len(), 2);
    }

    #[test]
    fn where_ignores_absent_predicates() {
        let member = EntityPath::new("Member", "member");
        let query = select([member.expr()]).from(&member).where_(None).where_all([None, None]);
        assert_eq!(query.where_, None);
    }

    #[test]
    fn without_paging_keeps_the_filter() {
        let member = EntityPath::new("Member", "member");
        let query = select([member.expr()])
            .from(&member)
            .where_(member.get("age").expr().gt(10))
            .order_by([member.get("age").expr().desc()])
            .offset(1)
            .limit(2);
        let counted = query.without_paging();
        assert_eq!(counted.where_, query.where_);
        assert_eq!(counted.offset, None);
        assert_eq!(counted.limit, None);
        assert!(counted.order_by.is_empty());
    }
}
