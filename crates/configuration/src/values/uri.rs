use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Secret;
use crate::environment::{Environment, Error, Variable};

/// The database connection URI, e.g. `sqlite::memory:` or `sqlite://members.db`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ConnectionUri(pub Secret);

impl ConnectionUri {
    /// A connection URI read from the given environment variable.
    pub fn from_environment(variable: impl Into<String>) -> Self {
        ConnectionUri(Secret::FromEnvironment {
            variable: Variable::new(variable),
        })
    }

    /// Resolve the URI, reading the environment if needed.
    pub fn resolve(&self, environment: &impl Environment) -> Result<String, Error> {
        match &self.0 {
            Secret::Plain(value) => Ok(value.clone()),
            Secret::FromEnvironment { variable } => environment.read(variable),
        }
    }
}

impl From<String> for ConnectionUri {
    fn from(value: String) -> Self {
        ConnectionUri(Secret::Plain(value))
    }
}

impl From<&str> for ConnectionUri {
    fn from(value: &str) -> Self {
        ConnectionUri(Secret::Plain(value.to_string()))
    }
}
