//! # Emporium Test
//!
//! In-memory HTTP testing for Emporium servers.
//!
//! [`TestClient`] feeds requests straight into
//! [`Server::dispatch`](emporium_server::Server::dispatch), so tests exercise
//! the full routing, binding and error path without opening a port.
//!
//! ## Example
//!
//! ```rust,ignore
//! use emporium_test::{MultipartBody, TestClient};
//! use http::StatusCode;
//!
//! let client = TestClient::new(server);
//!
//! client
//!     .get("/items/foo")
//!     .send()
//!     .await
//!     .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
//!
//! let response = client
//!     .post("/uploadfiles/")
//!     .multipart(MultipartBody::new().file("files", "a.txt", "text/plain", "hello"))
//!     .send()
//!     .await;
//! ```

#![doc(html_root_url = "https://docs.rs/emporium-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{MultipartBody, TestRequest, TestRequestBuilder, MULTIPART_BOUNDARY};
pub use response::TestResponse;
