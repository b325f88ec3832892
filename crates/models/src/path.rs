//! Typed handles to entities and their attributes.

use serde::{Deserialize, Serialize};

use crate::expression::Expression;

/// A catalog entity queried under an alias, e.g. `Member` as `member`.
///
/// Two paths over the same entity with different aliases are different sources, which is
/// how self-joins and correlated subqueries are written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityPath {
    pub entity: String,
    pub alias: String,
}

impl EntityPath {
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> EntityPath {
        EntityPath {
            entity: entity.into(),
            alias: alias.into(),
        }
    }

    /// A path to one of the attributes of this entity.
    pub fn get(&self, attribute: impl Into<String>) -> Path {
        Path {
            root: self.clone(),
            attribute: attribute.into(),
        }
    }

    /// The entity itself as a selectable expression.
    pub fn expr(&self) -> Expression {
        Expression::Entity(self.clone())
    }

    /// Count the rows of this entity (by key).
    pub fn count(&self) -> Expression {
        self.expr().count()
    }
}

/// A named attribute of an entity path. The attribute may be a column, the key, or an
/// association (which resolves to its foreign key column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    pub root: EntityPath,
    pub attribute: String,
}

impl Path {
    pub fn expr(&self) -> Expression {
        Expression::Path(self.clone())
    }
}

impl From<Path> for Expression {
    fn from(path: Path) -> Self {
        Expression::Path(path)
    }
}

impl From<&Path> for Expression {
    fn from(path: &Path) -> Self {
        Expression::Path(path.clone())
    }
}

impl From<&EntityPath> for Expression {
    fn from(path: &EntityPath) -> Self {
        Expression::Entity(path.clone())
    }
}
