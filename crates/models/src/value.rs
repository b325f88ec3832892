//! Scalar values flowing in and out of queries.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A scalar value, either a literal operand or a column of a result row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Integers widen to floats; everything else is `None`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// A short name for the kind of value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A value could not be converted into the requested Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("expected {expected} but found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("expected {expected} but found null")]
    UnexpectedNull { expected: &'static str },
}

/// Conversion from a result [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    if value.is_null() {
        ConversionError::UnexpectedNull { expected }
    } else {
        ConversionError::TypeMismatch {
            expected,
            found: value.kind(),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_i64().ok_or_else(|| mismatch("integer", &value))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = value.as_i64().ok_or_else(|| mismatch("integer", &value))?;
        i32::try_from(wide).map_err(|_| ConversionError::TypeMismatch {
            expected: "32-bit integer",
            found: "64-bit integer",
        })
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = value.as_i64().ok_or_else(|| mismatch("integer", &value))?;
        u64::try_from(wide).map_err(|_| ConversionError::TypeMismatch {
            expected: "unsigned integer",
            found: "negative integer",
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_f64().ok_or_else(|| mismatch("real", &value))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_reals() {
        assert_eq!(f64::from_value(Value::Integer(40)), Ok(40.0));
    }

    #[test]
    fn null_is_only_accepted_by_options() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            String::from_value(Value::Null),
            Err(ConversionError::UnexpectedNull { expected: "text" })
        );
    }

    #[test]
    fn text_is_not_an_integer() {
        assert_eq!(
            i64::from_value(Value::from("ten")),
            Err(ConversionError::TypeMismatch {
                expected: "integer",
                found: "text"
            })
        );
    }

    #[test]
    fn counts_are_never_negative() {
        assert_eq!(u64::from_value(Value::Integer(7)), Ok(7));
        assert_eq!(
            u64::from_value(Value::Integer(-1)),
            Err(ConversionError::TypeMismatch {
                expected: "unsigned integer",
                found: "negative integer"
            })
        );
        assert_eq!(
            u64::from_value(Value::Null),
            Err(ConversionError::UnexpectedNull { expected: "integer" })
        );
    }
}
