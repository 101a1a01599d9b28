//! Offers bundling several items.

use emporium_core::{FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::item::ITEM_SCHEMA;
use super::Item;

/// Schema of [`Offer`].
pub static OFFER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("Offer")
        .field(FieldSpec::new("id", FieldType::String))
        .field(FieldSpec::new("name", FieldType::String))
        .field(FieldSpec::new("description", FieldType::String).optional())
        .field(FieldSpec::new("price", FieldType::Float))
        .field(FieldSpec::new("items", FieldType::list(FieldType::Model(&ITEM_SCHEMA))))
});

/// A priced bundle of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer identifier.
    pub id: String,
    /// Offer name.
    pub name: String,
    /// Free text.
    pub description: Option<String>,
    /// Bundle price.
    pub price: f64,
    /// Items in the bundle, in order.
    pub items: Vec<Item>,
}

impl Model for Offer {
    fn schema() -> &'static Schema {
        &OFFER_SCHEMA
    }
}
