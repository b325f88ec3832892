//! Runtime configuration.

use query_engine_metadata::metadata;

use crate::values::PoolSettings;

/// The 'Configuration' type collects all the information necessary to run queries.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves secrets against the environment. Keeping
/// the two apart means the query engine never deals with the evolution of the file format.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub pool_settings: PoolSettings,
    pub connection_uri: String,
}
