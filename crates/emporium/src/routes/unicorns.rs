//! Unicorn routes and the handler for their exception.

use emporium_core::{ApiError, DomainException, FieldSpec, FieldType};
use emporium_extract::{Arguments, ParamSpec};
use emporium_server::{Endpoint, Reply};
use http::StatusCode;
use serde_json::json;

use crate::models::unicorn_exception;

async fn read_unicorn(args: Arguments) -> Result<Reply, ApiError> {
    let name: String = args.get("name")?;
    if name == "yolo" {
        tracing::info!(%name, "unicorn misbehaved");
        return Err(unicorn_exception(name));
    }
    Ok(Reply::new(json!({ "unicorn_name": name })))
}

/// Renders a unicorn exception as 418 I'm a teapot.
pub fn unicorn_exception_handler(exc: &DomainException) -> Reply {
    Reply::new(json!({
        "message": format!("Oops! {} did something. There goes a rainbow...", exc.subject())
    }))
    .with_status(StatusCode::IM_A_TEAPOT)
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![Endpoint::get("/unicorns/{name}", "read_unicorn", read_unicorn)
        .param(ParamSpec::path(FieldSpec::new("name", FieldType::String)))
        .tag("unicorn")]
}
