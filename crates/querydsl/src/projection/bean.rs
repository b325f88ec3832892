//! Value objects built from a row: by constructor, by direct field assignment, or through
//! setters.

use std::any::type_name;

use query_engine_metadata::metadata::ScalarType;
use query_engine_sql::sql::execution_plan::SelectItemLayout;
use querydsl_models::{ConversionError, Expression, ResultRow, Value};

use crate::error::Error;
use crate::projection::{describe, scalar_item, Projection};

/// How a [`QBean`] fills its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Constructor,
    Fields,
    Bean,
}

/// A destination built from all selected values at once, in select order.
pub trait Constructor: Sized {
    /// The parameter types, in order.
    fn parameter_types() -> Vec<ScalarType>;

    fn construct(arguments: Vec<Value>) -> Result<Self, ConversionError>;
}

/// A destination whose fields are assigned directly.
pub trait Fields: Default {
    /// Assign the field called `name`. Returns `false` when there is no such field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<bool, ConversionError>;
}

/// A destination assigned through its setters, which may validate or transform the value.
pub trait Bean: Default {
    /// Call the setter of the property called `name`. Returns `false` when there is no
    /// such property.
    fn set_property(&mut self, name: &str, value: Value) -> Result<bool, ConversionError>;
}

type ConstructFn<T> = fn(Vec<Value>) -> Result<T, ConversionError>;
type AssignFn<T> = fn(&mut T, &str, Value) -> Result<bool, ConversionError>;

enum Mapper<T> {
    Construct {
        parameter_types: Vec<ScalarType>,
        construct: ConstructFn<T>,
    },
    Assign {
        new: fn() -> T,
        assign: AssignFn<T>,
    },
}

/// A projection onto a value object of type `T`.
///
/// Assigning strategies match a source to a destination field by its alias, or by the
/// attribute name of a path. A source whose name matches no field is dropped and the field
/// keeps its default value.
pub struct QBean<T> {
    strategy: Strategy,
    items: Vec<Expression>,
    mapper: Mapper<T>,
}

impl<T> std::fmt::Debug for QBean<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QBean")
            .field("target", &type_name::<T>())
            .field("strategy", &self.strategy)
            .field("items", &self.items)
            .finish()
    }
}

impl<T: Constructor> QBean<T> {
    pub(crate) fn constructor(items: Vec<Expression>) -> QBean<T> {
        QBean {
            strategy: Strategy::Constructor,
            items,
            mapper: Mapper::Construct {
                parameter_types: T::parameter_types(),
                construct: T::construct,
            },
        }
    }
}

impl<T: Fields> QBean<T> {
    pub(crate) fn fields(items: Vec<Expression>) -> QBean<T> {
        QBean {
            strategy: Strategy::Fields,
            items,
            mapper: Mapper::Assign {
                new: T::default,
                assign: T::set_field,
            },
        }
    }
}

impl<T: Bean> QBean<T> {
    pub(crate) fn bean(items: Vec<Expression>) -> QBean<T> {
        QBean {
            strategy: Strategy::Bean,
            items,
            mapper: Mapper::Assign {
                new: T::default,
                assign: T::set_property,
            },
        }
    }
}

impl<T> QBean<T> {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// Integers widen to reals; an item of unknown type is accepted.
fn accepts(parameter: ScalarType, item: &SelectItemLayout) -> bool {
    match item {
        SelectItemLayout::Scalar(column) => match column.r#type {
            None => true,
            Some(found) => {
                found == parameter
                    || (found == ScalarType::Integer && parameter == ScalarType::Real)
            }
        },
        SelectItemLayout::Entity(_) => false,
    }
}

fn describe_layout(layout: &[SelectItemLayout]) -> String {
    let items: Vec<String> = layout
        .iter()
        .map(|item| match item {
            SelectItemLayout::Scalar(column) => column
                .r#type
                .map_or_else(|| "unknown".to_string(), |found| found.to_string()),
            SelectItemLayout::Entity(entity) => entity.entity.clone(),
        })
        .collect();
    format!("({})", items.join(", "))
}

fn describe_parameters(parameter_types: &[ScalarType]) -> String {
    let parameters: Vec<String> = parameter_types.iter().map(ToString::to_string).collect();
    format!("({})", parameters.join(", "))
}

impl<T> Projection for QBean<T> {
    type Output = T;

    fn expressions(&self) -> Vec<Expression> {
        self.items.clone()
    }

    fn check(&self, layout: &[SelectItemLayout]) -> Result<(), Error> {
        let Mapper::Construct {
            parameter_types, ..
        } = &self.mapper
        else {
            return Ok(());
        };

        let matches = parameter_types.len() == layout.len()
            && parameter_types
                .iter()
                .zip(layout)
                .all(|(parameter, item)| accepts(*parameter, item));
        if matches {
            Ok(())
        } else {
            Err(Error::ProjectionArity {
                target: type_name::<T>(),
                expected: describe_parameters(parameter_types),
                found: describe_layout(layout),
            })
        }
    }

    fn project(&self, row: ResultRow) -> Result<T, Error> {
        let mut items = row.0.into_iter();
        match &self.mapper {
            Mapper::Construct { construct, .. } => {
                let arguments = self
                    .items
                    .iter()
                    .map(|expression| scalar_item(items.next(), expression))
                    .collect::<Result<Vec<_>, Error>>()?;
                construct(arguments).map_err(|error| Error::projection(type_name::<T>(), error))
            }
            Mapper::Assign { new, assign } => {
                let mut target = new();
                for expression in &self.items {
                    let value = scalar_item(items.next(), expression)?;
                    let Some(name) = expression.output_name() else {
                        tracing::debug!(source = ?expression, "unnamed source dropped");
                        continue;
                    };
                    let assigned = assign(&mut target, name, value)
                        .map_err(|error| Error::projection(describe(expression), error))?;
                    if !assigned {
                        tracing::debug!(
                            source = name,
                            target = type_name::<T>(),
                            "no destination field, value dropped"
                        );
                    }
                }
                Ok(target)
            }
        }
    }
}
