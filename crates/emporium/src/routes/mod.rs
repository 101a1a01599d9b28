//! Route table.
//!
//! Routes match in registration order, so within each module literal
//! segments are registered ahead of captures they would collide with.

mod cars;
mod files;
mod items;
mod logistics;
mod models;
mod root;
mod unicorns;
mod users;

use emporium_core::SchemaError;
use emporium_server::Endpoint;

pub use unicorns::unicorn_exception_handler;

/// Returns every endpoint of the API.
pub fn endpoints() -> Result<Vec<Endpoint>, SchemaError> {
    let mut all = root::endpoints();
    all.extend(items::endpoints());
    all.extend(users::endpoints());
    all.extend(logistics::endpoints());
    all.extend(cars::endpoints());
    all.extend(files::endpoints());
    all.extend(models::endpoints()?);
    all.extend(unicorns::endpoints());
    Ok(all)
}
