//! Describe the SQL execution plan and how its result rows map back to values and entities.

use query_engine_metadata::metadata::ScalarType;

use crate::sql;

/// Definition of an execution plan to be run against the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan<Query> {
    /// The query.
    pub query: Query,
}

/// A SELECT together with the layout of its result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: sql::ast::Select,
    /// One entry per item the caller selected, in order.
    pub layout: Vec<SelectItemLayout>,
}

impl Query {
    /// Extract the query component as SQL.
    pub fn query_sql(&self) -> sql::string::SQL {
        select_to_sql(&self.select)
    }

    /// The query prefixed with `EXPLAIN QUERY PLAN`.
    pub fn explain_query_sql(&self) -> sql::string::SQL {
        let mut sql = sql::string::SQL::new();
        sql::ast::Explain::Select(&self.select).to_sql(&mut sql);
        sql
    }
}

/// A statement that changes storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Insert(sql::ast::Insert),
    Update(sql::ast::Update),
    Delete(sql::ast::Delete),
}

impl Mutation {
    pub fn query_sql(&self) -> sql::string::SQL {
        let mut sql = sql::string::SQL::new();
        match self {
            Mutation::Insert(insert) => insert.to_sql(&mut sql),
            Mutation::Update(update) => update.to_sql(&mut sql),
            Mutation::Delete(delete) => delete.to_sql(&mut sql),
        }
        sql
    }
}

/// How one selected item is read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItemLayout {
    /// A single column.
    Scalar(ColumnLayout),
    /// The columns of an entity.
    Entity(EntityLayout),
}

/// Where a value lives in the row and what it should decode to. `None` means the type
/// could not be known statically and is taken from the row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub alias: sql::ast::ColumnAlias,
    pub r#type: Option<ScalarType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityLayout {
    pub entity: String,
    pub key: ColumnLayout,
    /// Attribute name and column, key included.
    pub columns: Vec<(String, ColumnLayout)>,
    pub associations: Vec<AssociationLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationLayout {
    pub name: String,
    pub target_entity: String,
    pub foreign_key: ColumnLayout,
    /// Present when the association was fetch-joined.
    pub fetched: Option<Box<EntityLayout>>,
}

/// Build an execution plan for a select.
pub fn simple_query_plan(
    select: sql::ast::Select,
    layout: Vec<SelectItemLayout>,
) -> ExecutionPlan<Query> {
    ExecutionPlan {
        query: Query { select, layout },
    }
}

/// Build an execution plan for a mutation.
pub fn simple_mutation_plan(mutation: Mutation) -> ExecutionPlan<Mutation> {
    ExecutionPlan { query: mutation }
}

/// Convert a select to SQL.
pub fn select_to_sql(select: &sql::ast::Select) -> sql::string::SQL {
    let mut sql = sql::string::SQL::new();
    select.to_sql(&mut sql);
    sql
}
