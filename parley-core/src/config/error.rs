//! Errors raised while loading, overriding or saving a [`Config`](super::Config)

use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// An environment override did not parse
    #[error("{var}={value:?} is not valid: {source}")]
    Env {
        var: &'static str,
        value: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    LogLevel(#[from] LoggingError),

    #[error("{0} must be greater than 0")]
    Zero(&'static str),
}
