//! Value objects for projections.

use querydsl::{Bean, ConversionError, Constructor, Fields, FromValue, ScalarType, Value};

/// Named like the attributes of Member.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

impl MemberDto {
    pub fn new(username: &str, age: i32) -> MemberDto {
        MemberDto {
            username: Some(username.to_string()),
            age,
        }
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }
}

impl Constructor for MemberDto {
    fn parameter_types() -> Vec<ScalarType> {
        vec![ScalarType::Text, ScalarType::Integer]
    }

    fn construct(arguments: Vec<Value>) -> Result<Self, ConversionError> {
        let mut arguments = arguments.into_iter();
        Ok(MemberDto {
            username: FromValue::from_value(arguments.next().unwrap_or_default())?,
            age: FromValue::from_value(arguments.next().unwrap_or_default())?,
        })
    }
}

impl Fields for MemberDto {
    fn set_field(&mut self, name: &str, value: Value) -> Result<bool, ConversionError> {
        match name {
            "username" => self.username = FromValue::from_value(value)?,
            "age" => self.age = FromValue::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Bean for MemberDto {
    fn set_property(&mut self, name: &str, value: Value) -> Result<bool, ConversionError> {
        match name {
            "username" => self.set_username(FromValue::from_value(value)?),
            "age" => self.set_age(FromValue::from_value(value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Calls the username `name`, so Member attributes need an alias to reach it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserDto {
    pub name: Option<String>,
    pub age: i32,
}

impl Fields for UserDto {
    fn set_field(&mut self, name: &str, value: Value) -> Result<bool, ConversionError> {
        match name {
            "name" => self.name = FromValue::from_value(value)?,
            "age" => self.age = FromValue::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
