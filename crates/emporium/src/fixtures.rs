//! In-memory fixture tables standing in for a data store.
//!
//! Every table is built once on first use and never written to.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::models::{Item, Offer};

static FAKE_ITEMS_DB: Lazy<Vec<Value>> = Lazy::new(|| {
    vec![
        json!({"item_name": "Foo"}),
        json!({"item_name": "Bar"}),
        json!({"item_name": "Baz"}),
    ]
});

static FAKE_ITEMS_DB2: Lazy<IndexMap<&'static str, Value>> = Lazy::new(|| {
    IndexMap::from([
        ("foo", json!({"name": "Foo", "price": 50.2})),
        (
            "bar",
            json!({"name": "Bar", "description": "The Bar fighters", "price": 62, "tax": 20.2}),
        ),
        (
            "baz",
            json!({"name": "Baz", "description": "There goes my baz", "price": 50.2, "tax": 10.5}),
        ),
    ])
});

static KEYWORD_WEIGHTS: Lazy<IndexMap<&'static str, f64>> =
    Lazy::new(|| IndexMap::from([("foo", 2.3), ("bar", 3.4)]));

static LOGISTICS_ITEMS: Lazy<IndexMap<&'static str, Value>> = Lazy::new(|| {
    IndexMap::from([
        (
            "item1",
            json!({"description": "All my friends drive a low rider", "type": "car"}),
        ),
        (
            "item2",
            json!({
                "description": "Music is my aeroplane, it's my aeroplane",
                "type": "plane",
                "size": 5
            }),
        ),
    ])
});

/// Returns up to `limit` entries of the item name table starting at `skip`.
///
/// Negative values count as zero.
pub fn fake_items(skip: i64, limit: i64) -> &'static [Value] {
    let len = FAKE_ITEMS_DB.len();
    let start = usize::try_from(skip).unwrap_or(0).min(len);
    let take = usize::try_from(limit).unwrap_or(0);
    let end = start.saturating_add(take).min(len);
    &FAKE_ITEMS_DB[start..end]
}

/// Looks up a stored item record by id.
pub fn stored_item(item_id: &str) -> Option<&'static Value> {
    FAKE_ITEMS_DB2.get(item_id)
}

/// Returns the keyword weight table.
pub fn keyword_weights() -> &'static IndexMap<&'static str, f64> {
    &KEYWORD_WEIGHTS
}

/// Looks up a logistics record by id.
pub fn logistics_item(item_id: &str) -> Option<&'static Value> {
    LOGISTICS_ITEMS.get(item_id)
}

/// Returns every logistics record in table order.
pub fn logistics_items() -> impl Iterator<Item = &'static Value> {
    LOGISTICS_ITEMS.values()
}

/// Builds the demo offer with the given id.
pub fn create_offer(offer_id: impl Into<String>) -> Offer {
    Offer {
        id: offer_id.into(),
        name: "My Offer".to_string(),
        description: Some("This is my offer".to_string()),
        price: 122.24,
        items: vec![Item::new("my item", 200.125).with_tags(["electronics", "mobile", "accessories"])],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_items_paging() {
        assert_eq!(fake_items(0, 10).len(), 3);
        assert_eq!(fake_items(1, 1), &[json!({"item_name": "Bar"})]);
        assert!(fake_items(5, 10).is_empty());
        assert!(fake_items(0, 0).is_empty());
        assert_eq!(fake_items(-3, 2).len(), 2);
        assert!(fake_items(0, -1).is_empty());
        assert_eq!(fake_items(2, i64::MAX).len(), 1);
    }

    #[test]
    fn test_stored_item_lookup() {
        assert_eq!(stored_item("bar").unwrap()["description"], "The Bar fighters");
        assert!(stored_item("qux").is_none());
    }

    #[test]
    fn test_keyword_weights_order() {
        let keys: Vec<_> = keyword_weights().keys().copied().collect();
        assert_eq!(keys, vec!["foo", "bar"]);
    }

    #[test]
    fn test_logistics_items() {
        assert_eq!(logistics_items().count(), 2);
        assert_eq!(logistics_item("item2").unwrap()["size"], 5);
    }

    #[test]
    fn test_create_offer_tags_sorted() {
        let offer = serde_json::to_value(create_offer("42")).unwrap();
        assert_eq!(offer["id"], "42");
        assert_eq!(
            offer["items"][0]["tags"],
            json!(["accessories", "electronics", "mobile"])
        );
    }
}
