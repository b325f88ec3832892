//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

/// The errors that can be thrown when processing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unsupported configuration version {0}, expected {1}")]
    UnsupportedVersion(u32, u32),

    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when writing configuration to disk.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("cannot serialize configuration: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The errors that can be thrown when resolving the runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("cannot resolve the connection URI: {0}")]
    MissingEnvironmentVariable(#[from] crate::environment::Error),
}
