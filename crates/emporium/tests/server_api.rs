//! End-to-end tests for server-level behavior: built-in endpoints,
//! routing failures and request IDs.

mod common;

use http::{Method, StatusCode};
use serde_json::json;

use common::client;

#[tokio::test]
async fn test_health() {
    client()
        .get("/health")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("status", &json!("healthy"));
}

#[tokio::test]
async fn test_openapi_document() {
    let response = client().get("/openapi.json").send().await;
    response.assert_status(StatusCode::OK);
    let doc = response.json_value().unwrap();

    let create = &doc["paths"]["/items"]["post"];
    assert_eq!(create["operationId"], "create_item");
    assert_eq!(create["tags"], json!(["items"]));
    assert!(create["responses"]["201"].is_object());
    assert!(create["requestBody"]["content"]["application/json"]["examples"]["normal"].is_object());

    let update = &doc["paths"]["/items/{item_id}"]["put"];
    let item_id = update["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "item_id")
        .unwrap();
    assert_eq!(item_id["in"], "path");
    assert_eq!(item_id["schema"]["title"], "Id of the Item");

    let public = &doc["paths"]["/items/{item_id}/public"]["get"];
    assert!(public["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["name"] == "item-query"));

    let schemas = doc["components"]["schemas"].as_object().unwrap();
    for name in ["Item", "Image", "UserIn", "UserOut", "Offer", "HTTPValidationError"] {
        assert!(schemas.contains_key(name), "missing schema {name}");
    }
}

#[tokio::test]
async fn test_every_operation_documented() {
    let client = client();
    let doc = client.get("/openapi.json").send().await.json_value().unwrap();
    let documented: usize = doc["paths"]
        .as_object()
        .unwrap()
        .values()
        .map(|ops| ops.as_object().unwrap().len())
        .sum();
    assert_eq!(documented, client.server().endpoints().count());
}

#[tokio::test]
async fn test_unknown_path() {
    client()
        .get("/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json_eq(&json!({"detail": "Not Found"}));
}

#[tokio::test]
async fn test_method_not_allowed_lists_methods() {
    let response = client().delete("/items").send().await;
    response
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_json_eq(&json!({"detail": "Method Not Allowed"}));
    let allow = response.header_str("allow").unwrap();
    assert!(allow.contains("GET"));
    assert!(allow.contains("POST"));

    client()
        .request(Method::PATCH, "/users/me")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_generated() {
    let first = client().get("/").send().await;
    let second = client().get("/").send().await;
    let a = first.header_str("x-request-id").unwrap();
    let b = second.header_str("x-request-id").unwrap();
    assert_eq!(a.len(), 36);
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_request_id_echoed_on_errors() {
    let id = "0190a3c2-6f1e-7c3a-9d2b-3f4e5a6b7c8d";
    let response = client()
        .get("/items/qux/name")
        .header("x-request-id", id)
        .send()
        .await;
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_header("x-request-id", id);
}

#[tokio::test]
async fn test_empty_path_segment_is_not_found() {
    client()
        .get("/items//name")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json_eq(&json!({"detail": "Not Found"}));

    let response = client().put("/items//").json(&json!({})).send().await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.header("allow").is_none());
}

#[tokio::test]
async fn test_trailing_slash_tolerated() {
    client()
        .get("/users/me/")
        .send()
        .await
        .assert_json_eq(&json!({"user_id": "current user"}));
}
