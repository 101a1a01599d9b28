//! Logistics routes.

use emporium_core::{ApiError, FieldSpec, FieldType, Model, ResponseModel};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};

use crate::fixtures;
use crate::models::{vehicle_union, BaseItem, BASE_ITEM_SCHEMA};

async fn get_logistics_item(args: Arguments) -> Result<Reply, ApiError> {
    let item_id: String = args.get("item_id")?;
    fixtures::logistics_item(&item_id)
        .map(|record| Reply::new(record.clone()))
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

async fn get_logistics_items(_args: Arguments) -> Result<Reply, ApiError> {
    let items = fixtures::logistics_items()
        .map(BaseItem::validate)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|errors| {
            let detail: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ApiError::internal(format!("logistics fixture is not a BaseItem: {}", detail.join("; ")))
        })?;
    Reply::json(&items)
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::get("/logistics/items/{item_id}", "get_logistics_item", get_logistics_item)
            .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::String)))
            .response_model(ResponseModel::Union(vehicle_union())),
        Endpoint::get("/logistics/items", "get_logistics_items", get_logistics_items)
            .response_model(ResponseModel::list_of(&BASE_ITEM_SCHEMA)),
    ]
    .into_iter()
    .map(|e| e.tag("logistics"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_unknown_discriminant_is_server_fault() {
        let endpoint = endpoints().remove(0);
        let err = endpoint
            .render(&json!({"description": "Row row row your boat", "type": "boat"}))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_plane_record_keeps_size() {
        let endpoint = endpoints().remove(0);
        let rendered = endpoint
            .render(fixtures::logistics_item("item2").unwrap())
            .unwrap();
        assert_eq!(rendered["size"], 5);
        assert_eq!(rendered["type"], "plane");
    }
}
