//! Handle the translation of literal values.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use querydsl_models as models;

/// Convert a literal into a SQL value. Every value ends up as a bound parameter.
pub fn translate_value(value: &models::Value) -> sql::ast::Value {
    match value {
        models::Value::Null => sql::ast::Value::Null,
        models::Value::Boolean(b) => sql::ast::Value::Bool(*b),
        models::Value::Integer(i) => sql::ast::Value::Int8(*i),
        models::Value::Real(f) => sql::ast::Value::Float8(*f),
        models::Value::Text(s) => sql::ast::Value::String(s.clone()),
    }
}

/// The scalar type of a literal. `NULL` has none.
pub fn value_type(value: &models::Value) -> Option<metadata::ScalarType> {
    match value {
        models::Value::Null => None,
        models::Value::Boolean(_) => Some(metadata::ScalarType::Boolean),
        models::Value::Integer(_) => Some(metadata::ScalarType::Integer),
        models::Value::Real(_) => Some(metadata::ScalarType::Real),
        models::Value::Text(_) => Some(metadata::ScalarType::Text),
    }
}
