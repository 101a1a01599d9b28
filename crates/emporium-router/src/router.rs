//! Request routing and path matching.
//!
//! Routes are matched in registration order and the first template that fits
//! wins, so a literal route such as `/users/me` must be registered before the
//! parameterised `/users/{user_id}` it would otherwise be shadowed by.
//!
//! # Example
//!
//! ```rust
//! use emporium_router::{RouteLookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/users/me", "read_user_me");
//! router.add_route(Method::GET, "/users/{user_id}", "read_user");
//!
//! match router.match_route(&Method::GET, "/users/alice") {
//!     RouteLookup::Found(m) => {
//!         assert_eq!(m.operation_id(), "read_user");
//!         assert_eq!(m.param("user_id"), Some("alice"));
//!     }
//!     other => panic!("unexpected lookup: {other:?}"),
//! }
//! ```

use http::Method;

use crate::params::Params;

/// A matched route with its captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    operation_id: String,
    pattern: String,
    params: Params,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, pattern: impl Into<String>, params: Params) -> Self {
        Self {
            operation_id: operation_id.into(),
            pattern: pattern.into(),
            params,
        }
    }

    /// Returns the operation ID of the matched route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the template the request matched (e.g. `/items/{item_id}`).
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Consumes the match and returns the captured parameters.
    #[must_use]
    pub fn into_params(self) -> Params {
        self.params
    }

    /// Returns a single captured parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

/// Outcome of a route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    /// A route matched both method and path.
    Found(RouteMatch),
    /// The path matched one or more routes, none of them for this method.
    MethodNotAllowed(Vec<Method>),
    /// No route matched the path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    pattern: String,
    segments: Vec<PathSegment>,
    operation_id: String,
}

impl Route {
    fn new(method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        Self {
            method,
            pattern: pattern.to_string(),
            segments: Self::parse_segments(pattern),
            operation_id: operation_id.into(),
        }
    }

    fn parse_segments(pattern: &str) -> Vec<PathSegment> {
        split_path(pattern)
            .into_iter()
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => PathSegment::Param(name.to_string()),
                None => PathSegment::Literal(s.to_string()),
            })
            .collect()
    }

    /// Returns the HTTP method of this route.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template of this route.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the operation ID of this route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the names of the parameters captured by this route's template.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Param(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    fn match_path(&self, path_segments: &[&str]) -> Option<Params> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PathSegment::Param(_) if actual.is_empty() => return None,
                PathSegment::Param(name) => {
                    let value = urlencoding::decode(actual)
                        .map_or_else(|_| (*actual).to_string(), |v| v.into_owned());
                    params.push(name.clone(), value);
                }
            }
        }

        Some(params)
    }
}

/// Splits a path into segments after dropping the leading slash and one
/// trailing slash. Interior empty segments are kept, so `/items//name` has
/// three segments and `/` has none.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// HTTP request router.
///
/// Supports `{param}` templates. A single trailing slash is ignored on both
/// the template and the request path, so `/files/` and `/files` are
/// equivalent. A `{param}` never matches an empty segment.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// ```rust
    /// use emporium_router::Router;
    /// use http::Method;
    ///
    /// let mut router = Router::new();
    /// router.add_route(Method::POST, "/items", "create_item");
    /// assert_eq!(router.route_count(), 1);
    /// ```
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        operation_id: impl Into<String>,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), operation_id));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Iterates over the registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Checks whether an operation ID is registered.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }

    /// Looks up the route for a request.
    ///
    /// The first route whose method and template both match wins. When the
    /// path matches but the method does not, the allowed methods are
    /// reported so the caller can answer `405`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteLookup {
        let segments = split_path(path);
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.match_path(&segments) else {
                continue;
            };
            if route.method == *method {
                return RouteLookup::Found(RouteMatch::new(
                    route.operation_id.clone(),
                    route.pattern.clone(),
                    params,
                ));
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteLookup::NotFound
        } else {
            RouteLookup::MethodNotAllowed(allowed)
        }
    }
}
