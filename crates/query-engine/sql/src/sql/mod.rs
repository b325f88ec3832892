//! SQL AST, its conversion to a parameterized SQL string, and execution plans.

pub mod ast;
pub mod convert;
pub mod execution_plan;
pub mod helpers;
pub mod string;
