//! # Emporium Core
//!
//! Schema, validation and error types shared by every Emporium crate.
//!
//! - [`schema`]: declarative record schemas ([`Schema`], [`FieldSpec`],
//!   [`FieldType`], [`Constraint`]) and the [`Model`] trait
//! - [`validate`]: the validation engine turning raw JSON into coerced values
//! - [`response`]: response models, discriminated unions and projections
//! - [`ApiError`]: the error taxonomy rendered to HTTP responses
//! - [`RequestId`]: UUID v7 request identifier

#![doc(html_root_url = "https://docs.rs/emporium-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod response;
pub mod schema;
pub mod validate;

pub use context::{RequestId, REQUEST_ID_HEADER};
pub use error::{ApiError, ApiResult, DomainException, FieldError, FieldErrors, LocSegment};
pub use response::{DiscriminatedUnion, Projection, ResponseModel};
pub use schema::{Constraint, Example, FieldSpec, FieldType, Model, Schema, SchemaError};
pub use validate::Mode;
