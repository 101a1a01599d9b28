//! Vehicles shipped by the logistics desk.
//!
//! Records share a `type` discriminant. Responses that may hold either
//! vehicle use [`vehicle_union`], which picks the variant whose fixed `type`
//! matches the record.

use emporium_core::{DiscriminatedUnion, FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Name of the discriminant field.
pub const DISCRIMINANT: &str = "type";

/// Schema of [`BaseItem`].
pub static BASE_ITEM_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("BaseItem")
        .field(FieldSpec::new("description", FieldType::String))
        .field(FieldSpec::new(DISCRIMINANT, FieldType::String))
});

/// Schema of [`CarItem`].
pub static CAR_ITEM_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("CarItem")
        .field(FieldSpec::new("description", FieldType::String))
        .field(FieldSpec::new(DISCRIMINANT, FieldType::literal("car")).default("car".into()))
});

/// Schema of [`PlaneItem`].
pub static PLANE_ITEM_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new("PlaneItem")
        .field(FieldSpec::new("description", FieldType::String))
        .field(FieldSpec::new(DISCRIMINANT, FieldType::literal("plane")).default("plane".into()))
        .field(FieldSpec::new("size", FieldType::Integer))
});

/// `PlaneItem | CarItem`, selected by `type`.
pub fn vehicle_union() -> DiscriminatedUnion {
    DiscriminatedUnion::new(DISCRIMINANT, vec![&*PLANE_ITEM_SCHEMA, &*CAR_ITEM_SCHEMA])
}

/// Fields shared by every vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseItem {
    /// Free text.
    pub description: String,
    /// Discriminant.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Model for BaseItem {
    fn schema() -> &'static Schema {
        &BASE_ITEM_SCHEMA
    }
}

/// A car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarItem {
    /// Free text.
    pub description: String,
    /// Always `car`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Model for CarItem {
    fn schema() -> &'static Schema {
        &CAR_ITEM_SCHEMA
    }
}

/// A plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneItem {
    /// Free text.
    pub description: String,
    /// Always `plane`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Seats.
    pub size: i64,
}

impl Model for PlaneItem {
    fn schema() -> &'static Schema {
        &PLANE_ITEM_SCHEMA
    }
}
