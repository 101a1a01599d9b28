//! # Emporium Extract
//!
//! Parameter binding for Emporium endpoints.
//!
//! An endpoint declares its inputs as a [`Signature`] of [`ParamSpec`]s.
//! Binding reads each input from its channel (path, query, header, cookie,
//! form, file or JSON body), coerces and validates it with the
//! `emporium-core` validation engine, and returns typed [`Arguments`] or a
//! single error listing every failure.
//!
//! ## Example
//!
//! ```rust
//! use emporium_core::{FieldSpec, FieldType};
//! use emporium_extract::{ExtractionContext, ParamSpec, Signature, UploadLimits};
//! use http::Uri;
//!
//! # tokio_test::block_on(async {
//! let sig = Signature::new().param(ParamSpec::path(
//!     FieldSpec::new("item_id", FieldType::Integer).gt(1.0).le(125.0),
//! ));
//!
//! let ctx = ExtractionContext::builder()
//!     .uri(Uri::from_static("/items/200"))
//!     .path_param("item_id", "200")
//!     .build();
//! let err = sig.bind(&ctx, &UploadLimits::default()).await.unwrap_err();
//! assert_eq!(err.status_code(), http::StatusCode::UNPROCESSABLE_ENTITY);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/emporium-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod cookie;
mod error;
mod form;
mod multipart;
mod param;
mod signature;
mod upload;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use cookie::Cookies;
pub use error::{ExtractionError, ExtractionSource};
pub use form::FormData;
pub use multipart::{
    Multipart, MultipartForm, UploadLimits, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FILES,
    DEFAULT_MAX_FILE_SIZE,
};
pub use param::{FileKind, ParamSpec};
pub use signature::{Arguments, Signature};
pub use upload::{map_concurrent, read_all, UploadFile};
