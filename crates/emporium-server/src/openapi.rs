//! OpenAPI 3.1 document generation.
//!
//! The document is derived from the endpoint registry: each endpoint's
//! signature yields its parameters and request body, its response model
//! yields the success schema, and every schema reachable from either lands
//! in `components.schemas`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use emporium_core::Schema;

use crate::endpoint::Endpoint;

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.1.0";

const VALIDATION_ERROR_REF: &str = "#/components/schemas/HTTPValidationError";

/// Builds the API document for `endpoints`, in registration order.
#[must_use]
pub fn build_document<'a, I>(title: &str, version: &str, endpoints: I) -> Value
where
    I: IntoIterator<Item = &'a Endpoint>,
{
    let mut paths: IndexMap<String, Map<String, Value>> = IndexMap::new();
    let mut schemas: BTreeMap<String, &'static Schema> = BTreeMap::new();
    let mut any_validation = false;

    for endpoint in endpoints {
        for schema in endpoint.signature().schemas() {
            schemas.entry(schema.name().to_string()).or_insert(schema);
        }
        if let Some(model) = endpoint.response() {
            for schema in model.schemas() {
                schemas.entry(schema.name().to_string()).or_insert(schema);
            }
        }
        any_validation |= !endpoint.signature().params().is_empty();

        paths
            .entry(endpoint.path().to_string())
            .or_default()
            .insert(endpoint.method().as_str().to_lowercase(), operation(endpoint));
    }

    let mut components: Map<String, Value> = schemas
        .into_iter()
        .map(|(name, schema)| (name, schema.describe()))
        .collect();
    if any_validation {
        components.insert("HTTPValidationError".into(), http_validation_error());
        components.insert("ValidationError".into(), validation_error());
    }

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {"title": title, "version": version},
        "paths": paths,
        "components": {"schemas": components},
    })
}

fn operation(endpoint: &Endpoint) -> Value {
    let mut op = Map::new();
    if !endpoint.tags().is_empty() {
        op.insert("tags".into(), json!(endpoint.tags()));
    }
    let summary = endpoint
        .summary_text()
        .map_or_else(|| title_case(endpoint.operation_id()), str::to_string);
    op.insert("summary".into(), json!(summary));
    if let Some(description) = endpoint.description_text() {
        op.insert("description".into(), json!(description));
    }
    op.insert("operationId".into(), json!(endpoint.operation_id()));

    let parameters = endpoint.signature().describe_parameters();
    if !parameters.is_empty() {
        op.insert("parameters".into(), Value::Array(parameters));
    }
    if let Some(body) = endpoint.signature().describe_request_body() {
        op.insert("requestBody".into(), body);
    }

    let schema = endpoint
        .response()
        .map_or_else(|| json!({}), emporium_core::ResponseModel::describe);
    let mut responses = Map::new();
    responses.insert(
        endpoint.status_code().as_u16().to_string(),
        json!({
            "description": "Successful Response",
            "content": {"application/json": {"schema": schema}}
        }),
    );
    if !endpoint.signature().params().is_empty() {
        responses.insert(
            "422".into(),
            json!({
                "description": "Validation Error",
                "content": {"application/json": {"schema": {"$ref": VALIDATION_ERROR_REF}}}
            }),
        );
    }
    op.insert("responses".into(), Value::Object(responses));
    Value::Object(op)
}

/// `read_item_name` becomes `Read Item Name`.
fn title_case(operation_id: &str) -> String {
    operation_id
        .split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn http_validation_error() -> Value {
    json!({
        "title": "HTTPValidationError",
        "type": "object",
        "properties": {
            "detail": {
                "title": "Detail",
                "type": "array",
                "items": {"$ref": "#/components/schemas/ValidationError"}
            }
        }
    })
}

fn validation_error() -> Value {
    json!({
        "title": "ValidationError",
        "type": "object",
        "properties": {
            "loc": {
                "title": "Location",
                "type": "array",
                "items": {"anyOf": [{"type": "string"}, {"type": "integer"}]}
            },
            "field": {"title": "Field", "type": "string"},
            "msg": {"title": "Message", "type": "string"},
            "type": {"title": "Error Type", "type": "string"},
            "input": {"title": "Input"}
        },
        "required": ["loc", "msg", "type"]
    })
}
