//! Item routes.

use emporium_core::{ApiError, Example, FieldSpec, FieldType, ResponseModel};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::fixtures;
use crate::models::{item_examples, Item, User, ITEM_SCHEMA, USER_SCHEMA};

async fn read_items_paginated(args: Arguments) -> Result<Reply, ApiError> {
    let skip: i64 = args.get("skip")?;
    let limit: i64 = args.get("limit")?;
    let ads_id: Option<String> = args.get("ads_id")?;
    let user_agent: Option<String> = args.get("user_agent")?;
    tracing::debug!(skip, limit, ?ads_id, ?user_agent, "listing items");
    Reply::json(&fixtures::fake_items(skip, limit))
}

async fn create_item(args: Arguments) -> Result<Reply, ApiError> {
    let item: Item = args.get("item")?;
    Reply::json(&item)
}

#[derive(Serialize)]
struct ItemUpdate {
    item_id: i64,
    item: Item,
    user: User,
    importance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<String>,
}

async fn update_item(args: Arguments) -> Result<Reply, ApiError> {
    let update = ItemUpdate {
        item_id: args.get("item_id")?,
        item: args.get("item")?,
        user: args.get("user")?,
        importance: args.get("importance")?,
        q: args.get::<Option<String>>("q")?.filter(|q| !q.is_empty()),
    };
    Reply::json(&update)
}

async fn read_item_name(args: Arguments) -> Result<Reply, ApiError> {
    let item_id: String = args.get("item_id")?;
    match fixtures::stored_item(&item_id) {
        Some(item) => Ok(Reply::new(item.clone())),
        None => Err(ApiError::not_found("Item not found").with_header("X-Error", "There goes my error")),
    }
}

async fn read_item(args: Arguments) -> Result<Reply, ApiError> {
    let item_id: i64 = args.get("item_id")?;
    let q: Option<String> = args.get("q")?;
    let short: bool = args.get("short")?;

    let body = match q {
        Some(q) if !q.is_empty() => json!({"item_id": item_id, "q": q}),
        _ if !short => json!({"item_id": item_id, "description": "Amazing long description"}),
        _ => json!({"item_id": item_id}),
    };
    Ok(Reply::new(body))
}

fn item_body(name: &str) -> FieldSpec {
    item_examples()
        .into_iter()
        .fold(FieldSpec::new(name, FieldType::Model(&ITEM_SCHEMA)), FieldSpec::example)
}

fn importance_examples() -> Vec<Example> {
    vec![
        Example::new("normal", "A normal example", json!(1))
            .description("A *normal* item works correctly"),
        Example::new("converted", "An example with converted data", json!("1"))
            .description("Numeric strings are converted into actual `number` values"),
        Example::new("invalid", "Invalid data is rejected with an error", json!("one")),
    ]
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::get("/items", "read_items_paginated", read_items_paginated)
            .param(ParamSpec::query(FieldSpec::new("skip", FieldType::Integer).default(json!(0))))
            .param(ParamSpec::query(FieldSpec::new("limit", FieldType::Integer).default(json!(10))))
            .param(ParamSpec::cookie(FieldSpec::new("ads_id", FieldType::String).optional()))
            .param(ParamSpec::header(FieldSpec::new("user_agent", FieldType::String).optional())),
        Endpoint::post("/items", "create_item", create_item)
            .param(ParamSpec::body(item_body("item")))
            .response_model(ResponseModel::Schema(&ITEM_SCHEMA))
            .status(StatusCode::CREATED),
        Endpoint::put("/items/{item_id}", "update_item", update_item)
            .param(ParamSpec::path(
                FieldSpec::new("item_id", FieldType::Integer)
                    .gt(1.0)
                    .le(125.0)
                    .title("Id of the Item"),
            ))
            .param(ParamSpec::body(item_body("item")))
            .param(ParamSpec::body(FieldSpec::new("user", FieldType::Model(&USER_SCHEMA))))
            .param(ParamSpec::query(FieldSpec::new("q", FieldType::String).optional()))
            .param(ParamSpec::body(
                importance_examples()
                    .into_iter()
                    .fold(FieldSpec::new("importance", FieldType::Integer), FieldSpec::example),
            )),
        Endpoint::get("/items/{item_id}/name", "read_item_name", read_item_name)
            .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::String)))
            .response_model(ResponseModel::Schema(&ITEM_SCHEMA))
            .include(["name", "description"]),
        Endpoint::get("/items/{item_id}/public", "read_item", read_item)
            .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::Integer)))
            .param(ParamSpec::query(
                FieldSpec::new("q", FieldType::String)
                    .alias("item-query")
                    .optional()
                    .min_length(3)
                    .max_length(50)
                    .title("Query Str")
                    .description(
                        "Query string for the items to search in the database that have a good match",
                    ),
            ))
            .param(ParamSpec::query(FieldSpec::new("short", FieldType::Boolean).default(json!(false))))
            .exclude(["tax"]),
    ]
    .into_iter()
    .map(|e| e.tag("items"))
    .collect()
}
