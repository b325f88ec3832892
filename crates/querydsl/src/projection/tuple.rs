use std::sync::Arc;

use querydsl_models::{
    EntityPath, EntityRecord, Expression, FromValue, ResultItem, ResultRow, Value,
};

use crate::entity::Entity;
use crate::error::Error;
use crate::projection::{describe, Projection};

/// Several expressions selected together. See [`Tuple`].
#[derive(Debug, Clone)]
pub struct TupleProjection {
    expressions: Arc<[Expression]>,
}

impl TupleProjection {
    pub(crate) fn new(expressions: Vec<Expression>) -> TupleProjection {
        TupleProjection {
            expressions: expressions.into(),
        }
    }
}

impl Projection for TupleProjection {
    type Output = Tuple;

    fn expressions(&self) -> Vec<Expression> {
        self.expressions.to_vec()
    }

    fn project(&self, row: ResultRow) -> Result<Tuple, Error> {
        Ok(Tuple {
            expressions: Arc::clone(&self.expressions),
            items: row.0,
        })
    }
}

/// One result row, addressed by the expressions that were selected rather than by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    expressions: Arc<[Expression]>,
    items: Vec<ResultItem>,
}

impl Tuple {
    fn item(&self, expression: &Expression) -> Option<&ResultItem> {
        self.expressions
            .iter()
            .position(|selected| selected == expression)
            .and_then(|index| self.items.get(index))
    }

    /// The value selected for `expression`. `None` if it was not selected or is an entity.
    pub fn get(&self, expression: &Expression) -> Option<&Value> {
        match self.item(expression)? {
            ResultItem::Scalar(value) => Some(value),
            ResultItem::Entity(_) => None,
        }
    }

    /// The value selected for `expression`, converted. Unselected expressions read as null.
    pub fn get_as<T: FromValue>(&self, expression: &Expression) -> Result<T, Error> {
        let value = self.get(expression).cloned().unwrap_or_default();
        T::from_value(value).map_err(|error| Error::projection(describe(expression), error))
    }

    /// The record selected for an entity path. `None` when an outer join did not match.
    pub fn record(&self, path: &EntityPath) -> Option<&EntityRecord> {
        match self.item(&path.expr())? {
            ResultItem::Entity(record) => record.as_ref(),
            ResultItem::Scalar(_) => None,
        }
    }

    pub fn entity<E: Entity>(&self, path: &EntityPath) -> Result<Option<E>, Error> {
        self.record(path).map(E::from_record).transpose()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
