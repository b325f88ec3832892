//! Descriptors for statements that change storage.

use crate::expression::Expression;
use crate::path::EntityPath;
use crate::predicate;
use crate::value::Value;

/// A bulk `UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDescriptor {
    pub target: EntityPath,
    /// `(attribute path, new value)` pairs, applied in order.
    pub assignments: Vec<(Expression, Expression)>,
    pub where_: Option<Expression>,
}

impl UpdateDescriptor {
    pub fn new(target: &EntityPath) -> UpdateDescriptor {
        UpdateDescriptor {
            target: target.clone(),
            assignments: vec![],
            where_: None,
        }
    }

    #[must_use]
    pub fn set(mut self, attribute: &Expression, value: impl Into<Expression>) -> Self {
        self.assignments.push((attribute.clone(), value.into()));
        self
    }

    /// Set an attribute to `NULL`.
    #[must_use]
    pub fn set_null(self, attribute: &Expression) -> Self {
        self.set(attribute, Value::Null)
    }

    #[must_use]
    pub fn where_(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.where_ = predicate::and(self.where_.take(), condition.into());
        self
    }
}

/// A bulk `DELETE`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDescriptor {
    pub target: EntityPath,
    pub where_: Option<Expression>,
}

impl DeleteDescriptor {
    pub fn new(target: &EntityPath) -> DeleteDescriptor {
        DeleteDescriptor {
            target: target.clone(),
            where_: None,
        }
    }

    #[must_use]
    pub fn where_(mut self, condition: impl Into<Option<Expression>>) -> Self {
        self.where_ = predicate::and(self.where_.take(), condition.into());
        self
    }
}

/// A single-row `INSERT` of a new entity, by attribute name. Associations are given as
/// the key of the referenced entity.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertDescriptor {
    pub entity: String,
    pub values: Vec<(String, Value)>,
}

/// An `UPDATE` of a single entity identified by its key, as queued by a unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedUpdateDescriptor {
    pub entity: String,
    pub key: i64,
    pub values: Vec<(String, Value)>,
}
