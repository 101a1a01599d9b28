//! End-to-end tests for the item routes.
//!
//! Requests run through the complete server: routing, parameter binding,
//! validation, response shaping and error rendering.

mod common;

use http::StatusCode;
use serde_json::{json, Value};

use common::client;

fn error_fields(body: &Value) -> Vec<(String, String)> {
    body["detail"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    (
                        e["field"].as_str().unwrap_or_default().to_string(),
                        e["type"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn update_body(price: Value) -> Value {
    json!({
        "item": {"name": "Foo", "price": price},
        "user": {"username": "dave", "full_name": "Dave Grohl"},
        "importance": 5
    })
}

#[tokio::test]
async fn test_root_greeting() {
    client()
        .get("/")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"message": "Hello World"}));
}

#[tokio::test]
async fn test_paginated_defaults() {
    let response = client().get("/items").send().await;
    response.assert_status(StatusCode::OK).assert_json_eq(&json!([
        {"item_name": "Foo"},
        {"item_name": "Bar"},
        {"item_name": "Baz"}
    ]));
}

#[tokio::test]
async fn test_paginated_window() {
    let response = client()
        .get("/items")
        .query("skip", 1)
        .query("limit", 1)
        .cookie("ads_id", "abc")
        .header("User-Agent", "e2e")
        .send()
        .await;
    response.assert_json_eq(&json!([{"item_name": "Bar"}]));
}

#[tokio::test]
async fn test_paginated_rejects_non_integer() {
    let response = client().get("/items").query("skip", "many").send().await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["query", "skip"]))
        .assert_json_field("detail.0.type", &json!("int_parsing"));
}

#[tokio::test]
async fn test_create_item_shapes_response() {
    let response = client()
        .post("/items")
        .json(&json!({"name": "Foo", "price": 35.4, "tags": ["b", "a", "b"]}))
        .send()
        .await;
    response.assert_status(StatusCode::CREATED).assert_json_eq(&json!({
        "name": "Foo",
        "description": null,
        "price": 35.4,
        "tax": null,
        "tags": ["a", "b"],
        "image": null
    }));
}

#[tokio::test]
async fn test_create_item_coerces_numeric_string() {
    let response = client()
        .post("/items")
        .json(&json!({"name": "Foo", "price": "35.4"}))
        .send()
        .await;
    response
        .assert_status(StatusCode::CREATED)
        .assert_json_field("price", &json!(35.4));

    let response = client()
        .post("/items")
        .json(&json!({"name": "Foo", "price": "thirty five point four"}))
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.type", &json!("float_parsing"));
}

#[tokio::test]
async fn test_create_item_rejects_non_positive_price() {
    for price in [json!(0), json!(-3.5)] {
        let response = client()
            .post("/items")
            .json(&json!({"name": "Foo", "price": price}))
            .send()
            .await;
        response
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
            .assert_json_field("detail.0.loc", &json!(["body", "price"]))
            .assert_json_field("detail.0.type", &json!("greater_than"));
    }
}

#[tokio::test]
async fn test_create_item_reports_every_failing_field() {
    let response = client()
        .post("/items")
        .json(&json!({"price": "cheap", "description": "x".repeat(301)}))
        .send()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&response.json_value().unwrap());
    assert!(fields.contains(&("name".into(), "missing".into())));
    assert!(fields.contains(&("description".into(), "string_too_long".into())));
    assert!(fields.contains(&("price".into(), "float_parsing".into())));
}

#[tokio::test]
async fn test_create_item_nested_image_path() {
    let response = client()
        .post("/items")
        .json(&json!({
            "name": "Foo",
            "price": 1,
            "image": {"url": "ftp://example.com/a.png", "name": "pic"}
        }))
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["body", "image", "url"]))
        .assert_json_field("detail.0.field", &json!("image.url"));
}

#[tokio::test]
async fn test_create_item_malformed_json() {
    let response = client()
        .post("/items")
        .content_type("application/json")
        .body("{\"name\": ")
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.type", &json!("json_invalid"));
}

#[tokio::test]
async fn test_create_item_rejects_non_json_media_type() {
    let response = client()
        .post("/items")
        .content_type("text/plain")
        .body(r#"{"name": "Foo", "price": 1}"#)
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["body"]))
        .assert_json_field("detail.0.type", &json!("model_attributes_type"));
    assert_eq!(response.json_value().unwrap()["detail"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_item_importance_out_of_range() {
    let mut body = update_body(json!(1));
    body["importance"] = json!(u64::MAX);
    let response = client().put("/items/5").json(&body).send().await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["body", "importance"]))
        .assert_json_field("detail.0.type", &json!("int_parsing"));
}

#[tokio::test]
async fn test_update_item_embeds_bodies() {
    let response = client()
        .put("/items/5")
        .query("q", "somequery")
        .json(&update_body(json!(42)))
        .send()
        .await;
    response
        .assert_status(StatusCode::OK)
        .assert_json_field("item_id", &json!(5))
        .assert_json_field("item.name", &json!("Foo"))
        .assert_json_field("user.full_name", &json!("Dave Grohl"))
        .assert_json_field("importance", &json!(5))
        .assert_json_field("q", &json!("somequery"));
}

#[tokio::test]
async fn test_update_item_omits_empty_query() {
    let response = client().put("/items/5").json(&update_body(json!(42))).send().await;
    let body = response.json_value().unwrap();
    assert!(body.get("q").is_none());
}

#[tokio::test]
async fn test_update_item_id_bounds() {
    for (item_id, expected) in [("2", StatusCode::OK), ("125", StatusCode::OK)] {
        client()
            .put(format!("/items/{item_id}"))
            .json(&update_body(json!(1)))
            .send()
            .await
            .assert_status(expected);
    }

    for (item_id, kind) in [("1", "greater_than"), ("126", "less_than_equal")] {
        client()
            .put(format!("/items/{item_id}"))
            .json(&update_body(json!(1)))
            .send()
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
            .assert_json_field("detail.0.loc", &json!(["path", "item_id"]))
            .assert_json_field("detail.0.type", &json!(kind));
    }
}

#[tokio::test]
async fn test_update_item_collects_path_and_body_errors() {
    let response = client()
        .put("/items/500")
        .json(&update_body(json!(-1)))
        .send()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let locs: Vec<Value> = response.json_value().unwrap()["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["loc"].clone())
        .collect();
    assert!(locs.contains(&json!(["path", "item_id"])));
    assert!(locs.contains(&json!(["body", "item", "price"])));
}

#[tokio::test]
async fn test_update_item_missing_embedded_body() {
    let response = client()
        .put("/items/5")
        .json(&json!({"item": {"name": "Foo", "price": 1}, "importance": "one"}))
        .send()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&response.json_value().unwrap());
    assert!(fields.contains(&("user".into(), "missing".into())));
    assert!(fields.contains(&("importance".into(), "int_parsing".into())));
}

#[tokio::test]
async fn test_item_name_projection() {
    client()
        .get("/items/bar/name")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"name": "Bar", "description": "The Bar fighters"}));

    client()
        .get("/items/foo/name")
        .send()
        .await
        .assert_json_eq(&json!({"name": "Foo", "description": null}));
}

#[tokio::test]
async fn test_item_name_not_found_carries_header() {
    let response = client().get("/items/qux/name").send().await;
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_header("X-Error", "There goes my error")
        .assert_json_eq(&json!({"detail": "Item not found"}));
}

#[tokio::test]
async fn test_public_item_alias_query() {
    let response = client()
        .get("/items/5/public")
        .query("item-query", "abc")
        .send()
        .await;
    response.assert_json_eq(&json!({"item_id": 5, "q": "abc"}));

    let response = client().get("/items/5/public").query("item-query", "ab").send().await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["query", "item-query"]))
        .assert_json_field("detail.0.type", &json!("string_too_short"));
}

#[tokio::test]
async fn test_public_item_short_flag() {
    client()
        .get("/items/5/public")
        .send()
        .await
        .assert_json_eq(&json!({"item_id": 5, "description": "Amazing long description"}));

    for word in ["true", "1", "yes", "on"] {
        client()
            .get("/items/5/public")
            .query("short", word)
            .send()
            .await
            .assert_json_eq(&json!({"item_id": 5}));
    }

    client()
        .get("/items/5/public")
        .query("short", "maybe")
        .send()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.type", &json!("bool_parsing"));
}
