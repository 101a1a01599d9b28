//! Store items.

use std::collections::BTreeSet;

use emporium_core::{Example, FieldSpec, FieldType, Model, Schema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::image::IMAGE_SCHEMA;
use super::Image;

/// Schema of [`Item`].
pub static ITEM_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    item_examples().into_iter().fold(
        Schema::new("Item")
            .field(FieldSpec::new("name", FieldType::String).min_length(1))
            .field(
                FieldSpec::new("description", FieldType::String)
                    .optional()
                    .max_length(300)
                    .title("The description of the item"),
            )
            .field(
                FieldSpec::new("price", FieldType::Float)
                    .gt(0.0)
                    .description("The price of item, must be greater than zero"),
            )
            .field(FieldSpec::new("tax", FieldType::Float).optional())
            .field(FieldSpec::new("tags", FieldType::set(FieldType::String)).default(json!([])))
            .field(FieldSpec::new("image", FieldType::Model(&IMAGE_SCHEMA)).optional()),
        Schema::example,
    )
});

/// The normal, converted and invalid item payloads shown in the API docs.
pub fn item_examples() -> Vec<Example> {
    vec![
        Example::new(
            "normal",
            "A normal example",
            json!({"name": "Foo", "description": "A very nice item", "price": 35.4, "tax": 3.2}),
        )
        .description("A *normal* item works correctly"),
        Example::new(
            "converted",
            "An example with converted data",
            json!({"price": "35.4", "name": "Bar"}),
        )
        .description("Price strings are converted into actual `number` values"),
        Example::new(
            "invalid",
            "Invalid data is rejected with an error",
            json!({"name": "Baz", "price": "thirty five point four"}),
        ),
    ]
}

/// An item for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Free text, at most 300 characters.
    pub description: Option<String>,
    /// Strictly positive price.
    pub price: f64,
    /// Tax amount.
    pub tax: Option<f64>,
    /// Unique tags, kept sorted.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Optional picture.
    pub image: Option<Image>,
}

impl Item {
    /// Creates an item with no optional data.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            tax: None,
            tags: BTreeSet::new(),
            image: None,
        }
    }

    /// Adds tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl Model for Item {
    fn schema() -> &'static Schema {
        &ITEM_SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_minimal_item_gets_defaults() {
        let item = Item::validate(&json!({"name": "Foo", "price": 50.2})).unwrap();
        assert_eq!(item, Item::new("Foo", 50.2));
    }

    #[test]
    fn test_price_string_is_converted() {
        let item = Item::validate(&json!({"name": "Bar", "price": "35.4"})).unwrap();
        assert!((item.price - 35.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_words_are_rejected() {
        let errors = Item::validate(&json!({"name": "Baz", "price": "thirty five point four"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.for_field("price").unwrap().kind(), "float_parsing");
    }

    #[test]
    fn test_every_failing_field_is_reported() {
        let errors = Item::validate(&json!({"price": 0, "description": "x".repeat(301)})).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.for_field("name").unwrap().kind(), "missing");
        assert_eq!(errors.for_field("price").unwrap().kind(), "greater_than");
        assert_eq!(errors.for_field("description").unwrap().kind(), "string_too_long");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let errors = Item::validate(&json!({"name": "", "price": 1})).unwrap_err();
        assert_eq!(errors.for_field("name").unwrap().kind(), "string_too_short");
    }

    #[test]
    fn test_nested_image_error_has_dotted_path() {
        let errors = Item::validate(&json!({
            "name": "Foo",
            "price": 1,
            "image": {"url": "not a url", "name": "pic"}
        }))
        .unwrap_err();
        assert!(errors.for_field("image.url").is_some());
    }

    #[test]
    fn test_tags_collapse() {
        let item = Item::validate(&json!({
            "name": "Foo",
            "price": 1,
            "tags": ["mobile", "electronics", "mobile"]
        }))
        .unwrap();
        assert_eq!(item.tags.into_iter().collect::<Vec<_>>(), vec!["electronics", "mobile"]);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let coerced = ITEM_SCHEMA
            .validate(&json!({"name": "Foo", "price": 1, "colour": "red"}))
            .unwrap();
        assert!(coerced.get("colour").is_none());
    }

    #[test]
    fn test_schema_carries_examples() {
        let described = ITEM_SCHEMA.describe();
        assert_eq!(described["examples"]["converted"]["value"]["price"], "35.4");
        assert_eq!(described["properties"]["description"]["maxLength"], 300);
    }

    proptest! {
        #[test]
        fn test_non_positive_price_always_fails(price in -1.0e6f64..=0.0) {
            let errors = Item::validate(&json!({"name": "Foo", "price": price})).unwrap_err();
            prop_assert!(errors.for_field("price").is_some());
        }

        #[test]
        fn test_positive_price_always_passes(price in 1.0e-6f64..1.0e6) {
            let item = Item::validate(&json!({"name": "Foo", "price": price})).unwrap();
            prop_assert_eq!(item.price, price);
        }

        #[test]
        fn test_revalidation_is_idempotent(
            price in 0.01f64..1.0e4,
            tags in proptest::collection::vec("[a-z]{1,8}", 0..5),
            tax in proptest::option::of(0.0f64..100.0),
        ) {
            let item = Item::validate(&json!({"name": "Foo", "price": price, "tax": tax, "tags": tags})).unwrap();
            let again = Item::validate(&serde_json::to_value(&item).unwrap()).unwrap();
            prop_assert_eq!(item, again);
        }
    }
}
