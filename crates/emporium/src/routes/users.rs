//! User routes.

use emporium_core::{ApiError, FieldSpec, FieldType, ResponseModel};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use serde_json::{json, Map};

use crate::models::{fake_save_user, UserIn, USER_IN_SCHEMA, USER_OUT_SCHEMA};

async fn read_user_me(_args: Arguments) -> Result<Reply, ApiError> {
    Ok(Reply::new(json!({"user_id": "current user"})))
}

async fn read_user(args: Arguments) -> Result<Reply, ApiError> {
    let user_id: String = args.get("user_id")?;
    Ok(Reply::new(json!({ "user_id": user_id })))
}

async fn read_user_item(args: Arguments) -> Result<Reply, ApiError> {
    let user_id: String = args.get("user_id")?;
    let item_id: String = args.get("item_id")?;
    let q: Option<String> = args.get("q")?;
    let short: bool = args.get("short")?;

    let mut item = Map::new();
    item.insert("item_id".into(), json!(item_id));
    item.insert("owner_id".into(), json!(user_id));
    if let Some(q) = q.filter(|q| !q.is_empty()) {
        item.insert("q".into(), json!(q));
    }
    if !short {
        item.insert(
            "description".into(),
            json!("This is an amazing item that has a really long description"),
        );
    }
    Ok(Reply::new(item.into()))
}

async fn create_user(args: Arguments) -> Result<Reply, ApiError> {
    let user: UserIn = args.get("user")?;
    Reply::json(&fake_save_user(user))
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    // `/users/me` must be registered before `/users/{user_id}`.
    vec![
        Endpoint::get("/users/me", "read_user_me", read_user_me),
        Endpoint::get("/users/{user_id}", "read_user", read_user)
            .param(ParamSpec::path(FieldSpec::new("user_id", FieldType::String))),
        Endpoint::get("/users/{user_id}/items/{item_id}", "read_user_item", read_user_item)
            .param(ParamSpec::path(FieldSpec::new("user_id", FieldType::String)))
            .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::String)))
            .param(ParamSpec::query(FieldSpec::new("q", FieldType::String).optional()))
            .param(ParamSpec::query(FieldSpec::new("short", FieldType::Boolean).default(json!(false)))),
        Endpoint::post("/users", "create_user", create_user)
            .param(ParamSpec::body(FieldSpec::new("user", FieldType::Model(&USER_IN_SCHEMA))))
            .response_model(ResponseModel::Schema(&USER_OUT_SCHEMA)),
    ]
    .into_iter()
    .map(|e| e.tag("users"))
    .collect()
}
