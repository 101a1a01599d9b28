//! Application startup errors.

use thiserror::Error;

/// Errors raised while assembling or starting the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// A route declared an invalid schema.
    #[error("invalid route schema: {0}")]
    Schema(#[from] emporium_core::SchemaError),

    /// The server could not be built or run.
    #[error(transparent)]
    Server(#[from] emporium_server::ServerError),
}
