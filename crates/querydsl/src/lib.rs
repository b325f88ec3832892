//! A small relational query builder.
//!
//! Queries are described with entity paths and expressions, translated to SQL with every
//! literal bound as a parameter, and run against SQLite through a [`Session`]. Results are
//! projected onto tuples, entities or value objects.

pub mod bulk;
pub mod entity;
pub mod error;
pub mod factory;
pub mod projection;
pub mod query;
pub mod state;

pub use bulk::{DeleteClause, UpdateClause};
pub use entity::{Entity, Lazy};
pub use error::Error;
pub use factory::QueryFactory;
pub use projection::{Bean, Constructor, Fields, Projection, Projections, QBean, Strategy, Tuple};
pub use query::{Query, QueryResults};
pub use state::{create_state, InitializationError, State};

pub use query_engine_execution::Session;
pub use query_engine_metadata::metadata::ScalarType;
pub use querydsl_models::{
    call, column, predicate, select, template, ConversionError, EntityPath, EntityRecord,
    Expression, FromValue, Path, PredicateBuilder, QueryDescriptor, Value,
};
