//! End-to-end tests for the user routes.

mod common;

use http::StatusCode;
use serde_json::json;

use common::client;

#[tokio::test]
async fn test_me_wins_over_parameterised_route() {
    client()
        .get("/users/me")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"user_id": "current user"}));

    client()
        .get("/users/alice")
        .send()
        .await
        .assert_json_eq(&json!({"user_id": "alice"}));
}

#[tokio::test]
async fn test_user_item_long_form() {
    let response = client().get("/users/alice/items/i1").send().await;
    response.assert_json_eq(&json!({
        "item_id": "i1",
        "owner_id": "alice",
        "description": "This is an amazing item that has a really long description"
    }));
}

#[tokio::test]
async fn test_user_item_short_with_query() {
    let response = client()
        .get("/users/alice/items/i1")
        .query("q", "needle")
        .query("short", "1")
        .send()
        .await;
    response.assert_json_eq(&json!({"item_id": "i1", "owner_id": "alice", "q": "needle"}));
}

#[tokio::test]
async fn test_create_user_hides_password() {
    let response = client()
        .post("/users")
        .json(&json!({
            "username": "john",
            "password": "secret",
            "email": "john.doe@example.com",
            "full_name": "John Doe"
        }))
        .send()
        .await;
    response.assert_status(StatusCode::OK).assert_json_eq(&json!({
        "username": "john",
        "email": "john.doe@example.com",
        "full_name": "John Doe"
    }));
    let text = response.text().unwrap();
    assert!(!text.contains("password"));
    assert!(!text.contains("secret"));
}

#[tokio::test]
async fn test_create_user_optional_full_name() {
    let response = client()
        .post("/users")
        .json(&json!({"username": "jane", "password": "pw", "email": "jane@example.com"}))
        .send()
        .await;
    response.assert_json_field("full_name", &json!(null));
}

#[tokio::test]
async fn test_create_user_rejects_bad_email() {
    let response = client()
        .post("/users")
        .json(&json!({"username": "john", "password": "pw", "email": "not-an-email"}))
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["body", "email"]))
        .assert_json_field("detail.0.type", &json!("value_error.email"));
}

#[tokio::test]
async fn test_login_form() {
    let response = client()
        .post("/login/")
        .form(&[("username", "jane"), ("password", "pw")])
        .send()
        .await;
    response
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"username": "jane"}));
}

#[tokio::test]
async fn test_login_missing_password() {
    let response = client()
        .post("/login/")
        .form(&[("username", "jane")])
        .send()
        .await;
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("detail.0.loc", &json!(["form", "password"]))
        .assert_json_field("detail.0.type", &json!("missing"));
}
