//! Errors for translation.

use thiserror::Error;

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Entity '{0}' not found.")]
    EntityNotFound(String),
    #[error("Attribute '{attribute}' not found on entity '{entity}'.")]
    AttributeNotFound { entity: String, attribute: String },
    #[error("Attribute '{attribute}' of entity '{entity}' is not an association.")]
    NotAnAssociation { entity: String, attribute: String },
    #[error("Association '{association}' leads to entity '{expected}', but the join alias is for '{found}'.")]
    AssociationTargetMismatch {
        association: String,
        expected: String,
        found: String,
    },
    #[error("Alias '{0}' is not declared in this query.")]
    AliasNotFound(String),
    #[error("Alias '{0}' is declared more than once in the same query.")]
    DuplicateAlias(String),
    #[error("Alias '{alias}' refers to entity '{found}', not '{expected}'.")]
    AliasEntityMismatch {
        alias: String,
        expected: String,
        found: String,
    },
    #[error("Alias '{0}' refers to a subquery, not an entity.")]
    NotAnEntity(String),
    #[error("Column '{column}' not found in subquery '{alias}'.")]
    DerivedColumnNotFound { alias: String, column: String },
    #[error("'{0}' was used before any join.")]
    ModifierWithoutJoin(&'static str),
    #[error("Only joins that follow an association can be fetch joins.")]
    FetchJoinWithoutAssociation,
    #[error("Joins require a from clause.")]
    JoinWithoutFrom,
    #[error("Template '{template}' refers to argument {index} but only has {count}.")]
    TemplatePlaceholderOutOfRange {
        template: String,
        index: usize,
        count: usize,
    },
    #[error("'{0}' must be an aggregate or appear in the group by clause.")]
    UngroupedExpression(String),
    #[error("The select list is empty.")]
    EmptySelectList,
    #[error("A subquery used as a value must select exactly one item, found {0}.")]
    SubQueryArity(usize),
    #[error("Assignment target '{0}' must be an attribute of the updated entity.")]
    InvalidAssignmentTarget(String),
    #[error("An update requires at least one assignment.")]
    NoAssignments,
    #[error("Queries containing {0} are not supported.")]
    NotSupported(String),
}
