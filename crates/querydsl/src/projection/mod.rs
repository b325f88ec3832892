//! Projections turn result rows into Rust values.
//!
//! A projection names the expressions a query selects and converts each row of the result.
//! Tuples keep the row and are addressed by expression; entities and value objects are
//! built from it.

mod bean;
mod tuple;

use std::marker::PhantomData;

use query_engine_sql::sql::execution_plan::SelectItemLayout;
use querydsl_models::{
    ConversionError, EntityPath, Expression, FromValue, Path, ResultItem, ResultRow, Value,
};

use crate::entity::Entity;
use crate::error::Error;

pub use bean::{Bean, Constructor, Fields, QBean, Strategy};
pub use tuple::{Tuple, TupleProjection};

/// The select list of a query and how its rows are converted.
pub trait Projection {
    type Output;

    /// The expressions to select, in order.
    fn expressions(&self) -> Vec<Expression>;

    /// Check the projection against the layout of the translated query, before it runs.
    fn check(&self, layout: &[SelectItemLayout]) -> Result<(), Error> {
        let _ = layout;
        Ok(())
    }

    fn project(&self, row: ResultRow) -> Result<Self::Output, Error>;
}

/// Constructors for the projections that need more than an expression.
pub struct Projections;

impl Projections {
    /// A single expression converted to `T`.
    pub fn scalar<T: FromValue>(expression: impl Into<Expression>) -> Scalar<T> {
        Scalar {
            expression: expression.into(),
            marker: PhantomData,
        }
    }

    pub fn entity<E: Entity>(path: &EntityPath) -> EntityProjection<E> {
        EntityProjection {
            path: path.clone(),
            marker: PhantomData,
        }
    }

    pub fn tuple<I, E>(items: I) -> TupleProjection
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        TupleProjection::new(items.into_iter().map(Into::into).collect())
    }

    /// Pass the selected values, in order, to the constructor of `T`.
    pub fn constructor<T: Constructor>(items: Vec<Expression>) -> QBean<T> {
        QBean::constructor(items)
    }

    /// Assign each selected value to the field of `T` named like its source.
    pub fn fields<T: Fields>(items: Vec<Expression>) -> QBean<T> {
        QBean::fields(items)
    }

    /// Assign each selected value through the setter of `T` named like its source.
    pub fn bean<T: Bean>(items: Vec<Expression>) -> QBean<T> {
        QBean::bean(items)
    }
}

fn scalar_item(item: Option<ResultItem>, expression: &Expression) -> Result<Value, Error> {
    match item {
        Some(ResultItem::Scalar(value)) => Ok(value),
        Some(ResultItem::Entity(_)) => Err(Error::projection(
            describe(expression),
            ConversionError::TypeMismatch {
                expected: "scalar",
                found: "entity",
            },
        )),
        None => Ok(Value::Null),
    }
}

pub(crate) fn describe(expression: &Expression) -> String {
    expression
        .output_name()
        .map_or_else(|| format!("{expression:?}"), ToString::to_string)
}

impl Projection for Expression {
    type Output = Value;

    fn expressions(&self) -> Vec<Expression> {
        vec![self.clone()]
    }

    fn project(&self, row: ResultRow) -> Result<Value, Error> {
        scalar_item(row.0.into_iter().next(), self)
    }
}

impl Projection for Path {
    type Output = Value;

    fn expressions(&self) -> Vec<Expression> {
        vec![self.expr()]
    }

    fn project(&self, row: ResultRow) -> Result<Value, Error> {
        scalar_item(row.0.into_iter().next(), &self.expr())
    }
}

/// See [`Projections::scalar`].
#[derive(Debug, Clone)]
pub struct Scalar<T> {
    expression: Expression,
    marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> Projection for Scalar<T> {
    type Output = T;

    fn expressions(&self) -> Vec<Expression> {
        vec![self.expression.clone()]
    }

    fn project(&self, row: ResultRow) -> Result<T, Error> {
        let value = scalar_item(row.0.into_iter().next(), &self.expression)?;
        T::from_value(value)
            .map_err(|error| Error::projection(describe(&self.expression), error))
    }
}

/// See [`Projections::entity`].
#[derive(Debug, Clone)]
pub struct EntityProjection<E> {
    path: EntityPath,
    marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Projection for EntityProjection<E> {
    type Output = E;

    fn expressions(&self) -> Vec<Expression> {
        vec![self.path.expr()]
    }

    fn project(&self, row: ResultRow) -> Result<E, Error> {
        match row.0.into_iter().next() {
            Some(ResultItem::Entity(Some(record))) => E::from_record(&record),
            Some(ResultItem::Entity(None)) | None => Err(Error::projection(
                self.path.alias.clone(),
                ConversionError::UnexpectedNull { expected: E::ENTITY },
            )),
            Some(ResultItem::Scalar(value)) => Err(Error::projection(
                self.path.alias.clone(),
                ConversionError::TypeMismatch {
                    expected: E::ENTITY,
                    found: value.kind(),
                },
            )),
        }
    }
}
