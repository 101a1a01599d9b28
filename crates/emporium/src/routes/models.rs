//! Model catalogue routes.

use emporium_core::{ApiError, FieldSpec, FieldType, SchemaError};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use serde_json::json;

use crate::models::ModelName;

async fn get_model(args: Arguments) -> Result<Reply, ApiError> {
    let model_name: ModelName = args.get("model_name")?;
    let query_item: String = args.get("query_item")?;
    let message = match model_name {
        ModelName::Alexnet => "Deep Learning FTW",
        ModelName::Lenet => "LeCNN all the images",
        ModelName::Resnet => "Have some residuals",
    };
    Ok(Reply::new(json!({
        "model_name": model_name,
        "message": message,
        "q": query_item,
    })))
}

pub(crate) fn endpoints() -> Result<Vec<Endpoint>, SchemaError> {
    let query_item = FieldSpec::new("query_item", FieldType::String)
        .alias("q")
        .min_length(3)
        .max_length(50)
        .pattern("^fixedquery$")?;

    Ok(vec![Endpoint::get("/models/{model_name}", "get_model", get_model)
        .param(ParamSpec::path(FieldSpec::new("model_name", ModelName::field_type())))
        .param(ParamSpec::query(query_item))
        .tag("models")])
}
