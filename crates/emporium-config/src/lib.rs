//! Typed configuration for Emporium.
//!
//! [`EmporiumConfig`] has three sections:
//!
//! - [`ServerConfig`] - listen address, timeouts, OpenAPI toggle
//! - [`LoggingConfig`] - level, format, service name
//! - [`UploadsConfig`] - body, file and file-count limits, spool directory
//!
//! [`ConfigLoader`] layers a TOML or JSON file, `.env` and environment
//! variables over the defaults. Unknown keys are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8000"
//! request_timeout_ms = 30000
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [uploads]
//! max_body_size = 52428800
//! max_file_size = 10485760
//! max_files = 20
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `EMPORIUM__SERVER__HTTP_ADDR=127.0.0.1:9000`
//! - `EMPORIUM__LOGGING__FORMAT=pretty`
//! - `EMPORIUM__UPLOADS__MAX_FILES=5`

#![doc(html_root_url = "https://docs.rs/emporium-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::EmporiumConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LoggingConfig, ServerConfig, UploadsConfig};
