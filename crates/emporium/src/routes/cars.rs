//! Car routes.

use emporium_core::{ApiError, FieldSpec, FieldType};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use serde_json::json;

use crate::models::{Item, ITEM_SCHEMA};

async fn get_car(args: Arguments) -> Result<Reply, ApiError> {
    let car_name: String = args.get("car_name")?;
    let q: Vec<String> = args.get("q")?;
    Ok(Reply::new(json!({ "q": q, "car_name": car_name })))
}

async fn update_car(args: Arguments) -> Result<Reply, ApiError> {
    let car_id: String = args.get("car_id")?;
    let car_name: String = args.get("car_name")?;
    let item: Item = args.get("item")?;
    tracing::debug!(%car_id, %car_name, item = %item.name, "updating car");
    let item = serde_json::to_value(item)
        .map_err(|e| ApiError::internal_with_source("item is not serialisable", e))?;
    Ok(Reply::new(json!({ "car_id": car_id, "item": item, "car_name": car_name })))
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::get("/cars/{car_name}", "get_car", get_car)
            .param(ParamSpec::path(
                FieldSpec::new("car_name", FieldType::String).title("The name of the car"),
            ))
            .param(ParamSpec::query(
                FieldSpec::new("q", FieldType::list(FieldType::String)).default(json!(["foo", "bar"])),
            )),
        Endpoint::put("/cars/{car_id}", "update_car", update_car)
            .param(ParamSpec::path(FieldSpec::new("car_id", FieldType::Uuid)))
            .param(ParamSpec::query(FieldSpec::new("car_name", FieldType::String)))
            .param(ParamSpec::body(FieldSpec::new("item", FieldType::Model(&ITEM_SCHEMA))).embed()),
    ]
    .into_iter()
    .map(|e| e.tag("cars"))
    .collect()
}
