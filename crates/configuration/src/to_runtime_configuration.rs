//! Convert a parsed configuration into the runtime configuration.

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::version1::ParsedConfiguration;

/// Resolve the secrets of a parsed configuration against the environment.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = parsed_config.connection_uri.resolve(&environment)?;
    Ok(Configuration {
        metadata: parsed_config.metadata,
        pool_settings: parsed_config.pool_settings,
        connection_uri,
    })
}
