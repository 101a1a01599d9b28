//! The root configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, ServerConfig, UploadsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete Emporium configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use emporium_config::EmporiumConfig;
///
/// let config = EmporiumConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EmporiumConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Body and upload limits.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

impl EmporiumConfig {
    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than 0",
            ));
        }

        // A directive like "emporium=debug,hyper=warn" is left to the
        // subscriber; only a bare level is checked here.
        let level = self.logging.level.to_ascii_lowercase();
        if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {}", self.logging.level),
            ));
        }

        let uploads = &self.uploads;
        if uploads.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "uploads.max_body_size",
                "must be greater than 0",
            ));
        }
        if uploads.max_file_size == 0 || uploads.max_file_size > uploads.max_body_size {
            return Err(ConfigError::invalid_value(
                "uploads.max_file_size",
                "must be greater than 0 and at most uploads.max_body_size",
            ));
        }
        if uploads.max_files == 0 {
            return Err(ConfigError::invalid_value(
                "uploads.max_files",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs on localhost.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                http_addr: "127.0.0.1:8000".to_string(),
                ..ServerConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingConfig::default()
            },
            uploads: UploadsConfig::default(),
        }
    }

    /// Production preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Returns the parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }
}
