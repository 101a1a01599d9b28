//! Images attached to items.

use emporium_core::{FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Schema of [`Image`].
pub static IMAGE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("Image")
        .field(FieldSpec::new("url", FieldType::Url).description("The url of the image"))
        .field(
            FieldSpec::new("name", FieldType::String)
                .description("Name or title of the image provided by the creater"),
        )
});

/// A picture of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute http or https URL.
    pub url: String,
    /// Display name.
    pub name: String,
}

impl Model for Image {
    fn schema() -> &'static Schema {
        &IMAGE_SCHEMA
    }
}
