//! # Emporium Server
//!
//! HTTP server for Emporium, built on hyper and tokio:
//!
//! - [`Endpoint`] declarations tying a route to a signature, a handler and
//!   response shaping
//! - [`Server::dispatch`], the single request pipeline shared by the TCP
//!   server and the in-memory test client
//! - domain [`ExceptionHandlers`]
//! - graceful shutdown, `/health` and a generated `/openapi.json`
//!
//! ## Example
//!
//! ```rust,ignore
//! use emporium_server::{Endpoint, Reply, Server, ServerConfig};
//!
//! async fn root(_args: emporium_extract::Arguments) -> Result<Reply, emporium_core::ApiError> {
//!     Ok(Reply::new(serde_json::json!({"message": "Hello World"})))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .config(ServerConfig::builder().http_addr("127.0.0.1:8000").build())
//!         .endpoint(Endpoint::get("/", "root", root))
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/emporium-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod endpoint;
mod exception;
mod health;
pub mod openapi;
mod server;
pub mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use endpoint::{Endpoint, HandlerFn, HandlerFuture, Reply};
pub use exception::{ExceptionHandlerFn, ExceptionHandlers};
pub use health::{HealthCheck, HealthStatus};
pub use server::{
    HttpResponse, ResponseBody, Server, ServerBuilder, ServerError, HEALTH_PATH, OPENAPI_PATH,
};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
