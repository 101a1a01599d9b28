//! Structured logging for Emporium.
//!
//! Emporium logs through `tracing`. This crate installs the subscriber
//! ([`init_logging`]), fixes the field names every crate uses
//! ([`logging::fields`]), and provides the request lifecycle macros used by
//! the server:
//!
//! | Macro | Level | Fields |
//! |-------|-------|--------|
//! | [`log_request_start!`] | info | `request_id`, `http.method`, `http.path`, `operation_id` |
//! | [`log_request_complete!`] | info | `request_id`, `http.status_code`, `duration_ms` |
//! | [`log_request_rejected!`] | warn | `request_id`, `error.code`, `error` |
//! | [`log_request_error!`] | error | `request_id`, `error.code`, `error` |

#![doc(html_root_url = "https://docs.rs/emporium-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
