//! Top-level routes: greeting, offers, keyword weights and login.

use emporium_core::{ApiError, FieldSpec, FieldType, ResponseModel};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use serde_json::json;

use crate::fixtures;
use crate::models::OFFER_SCHEMA;

async fn root(_args: Arguments) -> Result<Reply, ApiError> {
    Ok(Reply::new(json!({"message": "Hello World"})))
}

async fn get_offer(args: Arguments) -> Result<Reply, ApiError> {
    let offer_id: String = args.get("offer_id")?;
    Reply::json(&fixtures::create_offer(offer_id))
}

async fn get_keyword_weights(_args: Arguments) -> Result<Reply, ApiError> {
    Reply::json(fixtures::keyword_weights())
}

async fn login(args: Arguments) -> Result<Reply, ApiError> {
    let username: String = args.get("username")?;
    tracing::debug!(%username, "login attempt");
    Ok(Reply::new(json!({ "username": username })))
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::get("/", "root", root),
        Endpoint::get("/offers/{offer_id}", "get_offer", get_offer)
            .param(ParamSpec::path(FieldSpec::new("offer_id", FieldType::String)))
            .response_model(ResponseModel::Schema(&OFFER_SCHEMA)),
        Endpoint::get("/keyword-weights", "get_keyword_weights", get_keyword_weights),
        Endpoint::post("/login/", "login", login)
            .param(ParamSpec::form(FieldSpec::new("username", FieldType::String)))
            .param(ParamSpec::form(FieldSpec::new("password", FieldType::String))),
    ]
}
