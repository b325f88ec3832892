//! The model of a query: values, paths, expressions, descriptors and the records a query
//! returns.
//!
//! Everything in this crate is pure data. Building a descriptor never touches a database;
//! translation and execution live in the `query-engine-*` crates.

pub mod expression;
pub mod mutation;
pub mod path;
pub mod predicate;
pub mod query;
pub mod response;
pub mod value;

pub use expression::{
    call, column, template, AggregateFunction, BinaryOperator, ComparisonOperator, Expression,
    Function,
};
pub use mutation::{DeleteDescriptor, InsertDescriptor, KeyedUpdateDescriptor, UpdateDescriptor};
pub use path::{EntityPath, Path};
pub use predicate::PredicateBuilder;
pub use query::{
    select, Direction, JoinClause, JoinKind, JoinModifier, JoinTarget, NullHandling,
    OrderSpecifier, QueryDescriptor,
};
pub use response::{Association, EntityRecord, ResultItem, ResultRow};
pub use value::{ConversionError, FromValue, Value};
