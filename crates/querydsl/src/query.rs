//! The fluent query builder and its terminal operations.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use query_engine_execution::Session;
use query_engine_metadata::metadata;
use query_engine_sql::sql::execution_plan;
use query_engine_translation::translation::query as translation;
use query_engine_sql::sql::helpers::COUNT_COLUMN_ALIAS;
use querydsl_models::{
    EntityPath, Expression, FromValue, OrderSpecifier, Path, QueryDescriptor, ResultItem, Value,
};

use crate::error::Error;
use crate::projection::Projection;

/// A page of results together with the number of rows matching the query when unpaged.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResults<T> {
    pub results: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// A query under construction, projected with `P`.
///
/// Building never touches the database. The terminal operations translate the query,
/// check the projection against the translated select list and run it in the session
/// they are given.
#[derive(Debug, Clone)]
pub struct Query<P> {
    metadata: Arc<metadata::Metadata>,
    descriptor: QueryDescriptor,
    projection: P,
}

impl<P: Projection> Query<P> {
    pub(crate) fn new(metadata: Arc<metadata::Metadata>, projection: P) -> Query<P> {
        Query {
            metadata,
            descriptor: QueryDescriptor {
                select: projection.expressions(),
                ..QueryDescriptor::default()
            },
            projection,
        }
    }

    fn map(self, f: impl FnOnce(QueryDescriptor) -> QueryDescriptor) -> Self {
        Query {
            descriptor: f(self.descriptor),
            ..self
        }
    }

    /// Replace the projection, keeping everything else.
    #[must_use]
    pub fn select<Q: Projection>(self, projection: Q) -> Query<Q> {
        Query {
            metadata: self.metadata,
            descriptor: QueryDescriptor {
                select: projection.expressions(),
                ..self.descriptor
            },
            projection,
        }
    }

    #[must_use]
    pub fn from(self, source: &EntityPath) -> Self {
        self.map(|query| query.from(source))
    }

    /// Inner join along an association.
    #[must_use]
    pub fn join(self, association: &Path, alias: &EntityPath) -> Self {
        self.map(|query| query.join(association, alias))
    }

    /// Left join along an association.
    #[must_use]
    pub fn left_join(self, association: &Path, alias: &EntityPath) -> Self {
        self.map(|query| query.left_join(association, alias))
    }

    #[must_use]
    pub fn join_entity(self, target: &EntityPath) -> Self {
        self.map(|query| query.join_entity(target))
    }

    #[must_use]
    pub fn left_join_entity(self, target: &EntityPath) -> Self {
        self.map(|query| query.left_join_entity(target))
    }

    /// Cartesian product with another entity. An `on` condition turns it into an inner join.
    #[must_use]
    pub fn cross_join(self, target: &EntityPath) -> Self {
        self.map(|query| query.cross_join(target))
    }

    #[must_use]
    pub fn join_subquery(self, subquery: QueryDescriptor, alias: impl Into<String>) -> Self {
        self.map(|query| query.join_subquery(subquery, alias))
    }

    #[must_use]
    pub fn left_join_subquery(self, subquery: QueryDescriptor, alias: impl Into<String>) -> Self {
        self.map(|query| query.left_join_subquery(subquery, alias))
    }

    #[must_use]
    pub fn on(self, condition: Expression) -> Self {
        self.map(|query| query.on(condition))
    }

    #[must_use]
    pub fn fetch_join(self) -> Self {
        self.map(QueryDescriptor::fetch_join)
    }

    #[must_use]
    pub fn where_(self, condition: impl Into<Option<Expression>>) -> Self {
        self.map(|query| query.where_(condition))
    }

    #[must_use]
    pub fn where_all<I>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Expression>>,
    {
        self.map(|query| query.where_all(conditions))
    }

    #[must_use]
    pub fn group_by<I, E>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.map(|query| query.group_by(keys))
    }

    #[must_use]
    pub fn having(self, condition: impl Into<Option<Expression>>) -> Self {
        self.map(|query| query.having(condition))
    }

    #[must_use]
    pub fn order_by<I>(self, specifiers: I) -> Self
    where
        I: IntoIterator<Item = OrderSpecifier>,
    {
        self.map(|query| query.order_by(specifiers))
    }

    #[must_use]
    pub fn offset(self, offset: u64) -> Self {
        self.map(|query| query.offset(offset))
    }

    #[must_use]
    pub fn limit(self, limit: u64) -> Self {
        self.map(|query| query.limit(limit))
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// The frozen descriptor, e.g. to use this query as a subquery.
    pub fn into_descriptor(self) -> QueryDescriptor {
        self.descriptor
    }

    /// Every row.
    pub async fn fetch(&self, session: &mut Session) -> Result<Vec<P::Output>, Error> {
        self.run(session, &self.descriptor).await
    }

    /// The only row, or `None` when nothing matches.
    pub async fn fetch_one(&self, session: &mut Session) -> Result<Option<P::Output>, Error> {
        let mut rows = self.run(session, &self.descriptor).await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            found => Err(Error::NonUniqueResult(found)),
        }
    }

    /// The first row, or `None` when nothing matches.
    pub async fn fetch_first(&self, session: &mut Session) -> Result<Option<P::Output>, Error> {
        let limit = self.descriptor.limit.map_or(1, |limit| limit.min(1));
        let first = self.descriptor.clone().limit(limit);
        Ok(self.run(session, &first).await?.into_iter().next())
    }

    /// The requested page along with the total number of matching rows.
    pub async fn fetch_results(
        &self,
        session: &mut Session,
    ) -> Result<QueryResults<P::Output>, Error> {
        let total = self.fetch_count(session).await?;
        let results = if total == 0 {
            vec![]
        } else {
            self.run(session, &self.descriptor).await?
        };
        Ok(QueryResults {
            results,
            total,
            offset: self.descriptor.offset.unwrap_or(0),
            limit: self.descriptor.limit,
        })
    }

    /// The number of matching rows, ignoring offset and limit.
    pub async fn fetch_count(&self, session: &mut Session) -> Result<u64, Error> {
        let plan = async { translation::translate_count(&self.metadata, &self.descriptor) }
            .instrument(info_span!("Plan count"))
            .await?;

        let rows = session
            .fetch(&plan)
            .instrument(info_span!("Execute count"))
            .await?;

        let count = match rows.into_iter().next().and_then(|row| row.0.into_iter().next()) {
            Some(ResultItem::Scalar(value)) => value,
            _ => Value::Null,
        };
        u64::from_value(count).map_err(|error| Error::projection(COUNT_COLUMN_ALIAS, error))
    }

    /// The SQL this query runs, pretty printed, and the plan the database chooses for it.
    pub async fn explain(&self, session: &mut Session) -> Result<(String, String), Error> {
        let plan = self.plan(&self.descriptor).await?;
        Ok(session.explain(&plan).await?)
    }

    async fn plan(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<execution_plan::ExecutionPlan<execution_plan::Query>, Error> {
        let plan = async { translation::translate(&self.metadata, descriptor) }
            .instrument(info_span!("Plan query"))
            .await?;
        self.projection.check(&plan.query.layout)?;
        Ok(plan)
    }

    async fn run(
        &self,
        session: &mut Session,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<P::Output>, Error> {
        let plan = self.plan(descriptor).await?;

        let rows = session
            .fetch(&plan)
            .instrument(info_span!("Execute query"))
            .await?;

        rows.into_iter()
            .map(|row| self.projection.project(row))
            .collect()
    }
}
