//! Unicorns and the exception they raise.

use emporium_core::{ApiError, FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Kind under which unicorn exceptions are raised and handled.
pub const UNICORN_EXCEPTION: &str = "UnicornException";

/// Schema of [`Unicorn`].
pub static UNICORN_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("Unicorn")
        .field(FieldSpec::new("name", FieldType::String))
        .field(FieldSpec::new("color", FieldType::String))
});

/// A unicorn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unicorn {
    /// Name.
    pub name: String,
    /// Colour.
    pub color: String,
}

impl Model for Unicorn {
    fn schema() -> &'static Schema {
        &UNICORN_SCHEMA
    }
}

/// Raises the unicorn domain exception for `name`.
pub fn unicorn_exception(name: impl Into<String>) -> ApiError {
    ApiError::domain(UNICORN_EXCEPTION, name)
}
