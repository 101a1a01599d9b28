//! Configuration loader with layered approach.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults
//! 2. A TOML or JSON file
//! 3. `.env` (loaded into the process environment)
//! 4. Environment variables `PREFIX__SECTION__KEY`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, EmporiumConfig, LogFormat};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "EMPORIUM";

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use emporium_config::ConfigLoader;
///
/// # fn main() -> Result<(), emporium_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("emporium.toml")?
///     .with_dotenv()
///     .with_env_prefix("EMPORIUM")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: EmporiumConfig,
    env_prefix: Option<String>,
    source: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader seeded with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EmporiumConfig::default(),
            env_prefix: None,
            source: None,
        }
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = EmporiumConfig::development();
        self
    }

    /// Load configuration from a file; the extension picks the format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unknown extension, or does not parse (unknown keys included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = Self::parse(&content, format)?;
        self.source = Some(path.to_path_buf());

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `toml` or `json` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use emporium_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[uploads]\nmax_files = 5\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.uploads.max_files, 5);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse(content, format)?;
        Ok(self)
    }

    /// Set the prefix for environment overrides, e.g. `EMPORIUM` for
    /// `EMPORIUM__SERVER__HTTP_ADDR`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into().to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Returns the file the configuration was read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(self) -> Result<EmporiumConfig, ConfigError> {
        self.load_from_vars(env::vars())
    }

    /// Like [`load`](Self::load), reading overrides from `vars` instead of
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load_from_vars<I>(mut self, vars: I) -> Result<EmporiumConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let mut overrides: Vec<(String, String)> = vars
                .into_iter()
                .filter(|(k, _)| k.starts_with(&marker))
                .collect();
            overrides.sort();
            for (key, value) in overrides {
                self.apply_env_var(&key, &value, &marker)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> EmporiumConfig {
        self.config
    }

    fn parse(content: &str, format: &str) -> Result<EmporiumConfig, ConfigError> {
        match format.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, marker: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(marker)
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
        let parts: Vec<&str> = rest.split("__").collect();

        let config = &mut self.config;
        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = parse_int(key, value)?;
            }
            ["SERVER", "OPENAPI_ENABLED"] => config.server.openapi_enabled = parse_flag(key, value)?,

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = LogFormat::parse(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected 'json' or 'pretty'"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_flag(key, value)?;
            }
            ["LOGGING", "SERVICE_NAME"] => config.logging.service_name = value.to_string(),

            ["UPLOADS", "MAX_BODY_SIZE"] => config.uploads.max_body_size = parse_int(key, value)?,
            ["UPLOADS", "MAX_FILE_SIZE"] => config.uploads.max_file_size = parse_int(key, value)?,
            ["UPLOADS", "MAX_FILES"] => config.uploads.max_files = parse_int(key, value)?,
            ["UPLOADS", "SPOOL_DIR"] => {
                config.uploads.spool_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }
        Ok(())
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load_from_vars(Vec::new()).unwrap();
        assert_eq!(config, EmporiumConfig::default());
    }

    #[test]
    fn test_toml_file() {
        let file = write_file(
            ".toml",
            "[server]\nhttp_addr = \"127.0.0.1:9000\"\n\n[logging]\nformat = \"pretty\"\n",
        );
        let loader = ConfigLoader::new().with_file(file.path()).unwrap();
        assert_eq!(loader.source(), Some(file.path()));
        let config = loader.load_from_vars(Vec::new()).unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:9000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.uploads.max_files, 20);
    }

    #[test]
    fn test_json_file() {
        let file = write_file(".json", r#"{"uploads": {"max_files": 2, "spool_dir": "/tmp/spool"}}"#);
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load_from_vars(Vec::new())
            .unwrap();
        assert_eq!(config.uploads.max_files, 2);
        assert_eq!(config.uploads.spool_dir, Some(PathBuf::from("/tmp/spool")));
    }

    #[test]
    fn test_unknown_key_in_file_rejected() {
        let file = write_file(".toml", "[server]\nport = 80\n");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/emporium.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(ConfigLoader::new()
            .with_optional_file("/nonexistent/emporium.toml")
            .is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_file(".yaml", "server: {}\n");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"127.0.0.1:9000\"\n", "toml")
            .unwrap()
            .with_env_prefix("emporium")
            .load_from_vars(vars(&[
                ("EMPORIUM__SERVER__HTTP_ADDR", "127.0.0.1:7000"),
                ("EMPORIUM__LOGGING__FORMAT", "Pretty"),
                ("EMPORIUM__LOGGING__ENABLED", "off"),
                ("EMPORIUM__UPLOADS__MAX_FILES", "4"),
                ("OTHER__SERVER__HTTP_ADDR", "ignored"),
            ]))
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:7000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.logging.enabled);
        assert_eq!(config.uploads.max_files, 4);
    }

    #[test]
    fn test_env_parse_errors() {
        let err = ConfigLoader::new()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[("EMPORIUM__UPLOADS__MAX_FILES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref reason, .. } if reason == "expected integer"));

        let err = ConfigLoader::new()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[("EMPORIUM__SERVER__PORT", "80")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let err = ConfigLoader::new()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[("EMPORIUM__LOGGING__LEVEL", "chatty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_spool_dir_cleared_by_empty_value() {
        let config = ConfigLoader::new()
            .with_string(r#"{"uploads": {"spool_dir": "/var/spool"}}"#, "json")
            .unwrap()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[("EMPORIUM__UPLOADS__SPOOL_DIR", "")]))
            .unwrap();
        assert!(config.uploads.spool_dir.is_none());
    }
}
