//! Configuration management for Parley
//!
//! Defaults, an optional TOML file, then `PARLEY_*` environment overrides,
//! validated last.

use crate::logging::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use humantime_serde::re::humantime;
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Relay engine configuration
    pub relay: RelayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// How long open connections get to drain after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Answer cross-origin requests from any origin
    pub enable_cors: bool,
}

/// Relay engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Outbound events buffered per live channel before pushes are dropped
    pub live_channel_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            shutdown_timeout: Duration::from_secs(5),
            enable_cors: true,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { live_channel_capacity: 64 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Convert to the logging subsystem's configuration
    pub fn to_log_config(&self) -> Result<LogConfig, ConfigError> {
        let level: LogLevel = self.level.parse()?;

        Ok(LogConfig::new(level)
            .with_timestamp(self.with_timestamp)
            .with_target(self.with_target)
            .json_format(self.json_format))
    }
}

impl Config {
    /// Load configuration from defaults plus environment variables
    ///
    /// Environment variables follow the pattern: PARLEY_<SECTION>_<KEY>
    /// Example: PARLEY_SERVER_BIND_ADDRESS=0.0.0.0:5000
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let mut config: Self = toml::from_str(&contents)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `PARLEY_*` environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| env::var(var).ok())
    }

    /// Overlay overrides fetched by variable name through `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(addr) = parse_override(&lookup, "PARLEY_SERVER_BIND_ADDRESS")? {
            self.server.bind_address = addr;
        }
        if let Some(timeout) =
            parse_override::<humantime::Duration>(&lookup, "PARLEY_SERVER_SHUTDOWN_TIMEOUT")?
        {
            self.server.shutdown_timeout = timeout.into();
        }
        if let Some(capacity) = parse_override(&lookup, "PARLEY_RELAY_LIVE_CHANNEL_CAPACITY")? {
            self.relay.live_channel_capacity = capacity;
        }
        if let Some(level) = lookup("PARLEY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_override(&lookup, "PARLEY_LOG_JSON")? {
            self.logging.json_format = json;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.live_channel_capacity == 0 {
            return Err(ConfigError::Zero("live_channel_capacity"));
        }
        self.logging.level.parse::<LogLevel>()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }
}

fn parse_override<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ConfigError::Env { var, value, source: Box::new(e) }),
        },
    }
}
