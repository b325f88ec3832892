//! Locating the static deployment used by the tests.

use std::path::PathBuf;

/// The SQL that creates the tables the static configuration maps.
pub const SCHEMA_FILENAME: &str = "schema.sql";

/// The `static` directory at the root of the workspace, found through the crate root that
/// `cargo test` provides. This crate lives in `crates/tests/<name>`.
pub fn get_deployment_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../static")
}

/// Read the schema of the static deployment.
pub async fn read_schema() -> anyhow::Result<String> {
    let path = get_deployment_dir().join(SCHEMA_FILENAME);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|error| anyhow::anyhow!("{}: {error}", path.display()))
}
