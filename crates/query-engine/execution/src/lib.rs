//! Query execution against a SQLite database.

pub mod error;
pub mod metrics;
pub mod mutation;
pub mod query;
pub mod session;

pub use session::Session;
