//! # Emporium
//!
//! A storefront tutorial API served by `emporium-server`.
//!
//! The crate holds the domain [`models`], the read-only [`fixtures`] that
//! stand in for a data store, and the [`routes`]. [`build_server`] wires
//! them together; [`server_config`] and [`log_config`] translate the loaded
//! [`EmporiumConfig`] into what the server and the logger expect.
//!
//! ```rust,ignore
//! let config = emporium_config::ConfigLoader::new().with_dotenv().load()?;
//! emporium_telemetry::init_logging(&emporium::log_config(&config.logging))?;
//! emporium::build_server(emporium::server_config(&config))?.run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/emporium/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::time::Duration;

use emporium_config::{EmporiumConfig, LogFormat, LoggingConfig};
use emporium_extract::UploadLimits;
use emporium_server::{Server, ServerConfig};
use emporium_telemetry::LogConfig;

mod error;
pub mod fixtures;
pub mod models;
pub mod routes;

pub use error::AppError;

/// Builds the server with every route and the unicorn exception handler.
pub fn build_server(config: ServerConfig) -> Result<Server, AppError> {
    let server = Server::builder()
        .config(config)
        .endpoints(routes::endpoints()?)
        .exception_handler(models::UNICORN_EXCEPTION, routes::unicorn_exception_handler)
        .build()?;
    tracing::debug!(endpoints = server.endpoints().count(), "server assembled");
    Ok(server)
}

/// Translates the loaded configuration into server settings.
pub fn server_config(config: &EmporiumConfig) -> ServerConfig {
    let uploads = &config.uploads;
    let mut limits = UploadLimits::new()
        .max_body_size(uploads.max_body_size)
        .max_file_size(uploads.max_file_size)
        .max_files(uploads.max_files);
    if let Some(dir) = &uploads.spool_dir {
        limits = limits.spool_dir(dir.clone());
    }

    ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .openapi_enabled(config.server.openapi_enabled)
        .service_name(config.logging.service_name.clone())
        .upload_limits(limits)
        .build()
}

/// Translates the logging section into a logger configuration.
pub fn log_config(config: &LoggingConfig) -> LogConfig {
    let base = match config.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };
    LogConfig {
        enabled: config.enabled,
        file_line_info: config.include_location,
        ..base
    }
    .with_level(config.level.clone())
    .with_service_name(config.service_name.clone())
}
