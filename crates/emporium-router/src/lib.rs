//! Path template router for Emporium.
//!
//! Maps an HTTP method and request path to the operation registered for it,
//! capturing `{param}` segments along the way.
//!
//! # Example
//!
//! ```rust
//! use emporium_router::{RouteLookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/items/{item_id}/name", "read_item_name");
//!
//! let RouteLookup::Found(m) = router.match_route(&Method::GET, "/items/foo/name") else {
//!     panic!("route should match");
//! };
//! assert_eq!(m.param("item_id"), Some("foo"));
//! ```

#![doc(html_root_url = "https://docs.rs/emporium-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod params;
mod router;

pub use params::Params;
pub use router::{Route, RouteLookup, RouteMatch, Router};
