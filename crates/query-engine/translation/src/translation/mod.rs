//! Translate query and mutation descriptors to execution plans (SQL) to be run against the
//! database.

pub mod error;
pub mod helpers;
pub mod mutation;
pub mod query;
