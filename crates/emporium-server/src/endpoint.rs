//! Endpoint declarations.
//!
//! An [`Endpoint`] ties a method and path template to a [`Signature`], an
//! async handler and the response shaping applied to whatever the handler
//! returns. Handlers receive bound [`Arguments`] and return a [`Reply`] or an
//! [`ApiError`].
//!
//! ```rust,ignore
//! use emporium_core::{ApiError, FieldSpec, FieldType};
//! use emporium_extract::{Arguments, ParamSpec};
//! use emporium_server::{Endpoint, Reply};
//!
//! async fn read_user(args: Arguments) -> Result<Reply, ApiError> {
//!     let user_id: String = args.get("user_id")?;
//!     Ok(Reply::new(serde_json::json!({ "user_id": user_id })))
//! }
//!
//! let endpoint = Endpoint::get("/users/{user_id}", "read_user", read_user)
//!     .param(ParamSpec::path(FieldSpec::new("user_id", FieldType::String)));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use emporium_core::response::project;
use emporium_core::{ApiError, Projection, ResponseModel};
use emporium_extract::{Arguments, ParamSpec, Signature};

/// Boxed future returned by an erased handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, ApiError>> + Send>>;

/// A type-erased handler.
pub type HandlerFn = Arc<dyn Fn(Arguments) -> HandlerFuture + Send + Sync>;

/// What a handler hands back: a JSON value plus optional status and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    body: Value,
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl Reply {
    /// Wraps a JSON value.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            body,
            status: None,
            headers: HeaderMap::new(),
        }
    }

    /// Serialises `body`.
    ///
    /// # Errors
    ///
    /// A value that cannot be represented as JSON is an internal error.
    pub fn json<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        serde_json::to_value(body)
            .map(Self::new)
            .map_err(|e| ApiError::internal_with_source("failed to serialise reply", e))
    }

    /// Overrides the endpoint's status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a response header. Invalid names or values are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid reply header"),
        }
        self
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the explicit status, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the extra headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (Value, Option<StatusCode>, HeaderMap) {
        (self.body, self.status, self.headers)
    }
}

/// One registered operation.
#[derive(Clone)]
pub struct Endpoint {
    method: Method,
    path: String,
    operation_id: String,
    signature: Signature,
    handler: HandlerFn,
    response_model: Option<ResponseModel>,
    projection: Projection,
    status: StatusCode,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl Endpoint {
    /// Creates an endpoint for `method` and `path`.
    pub fn new<F, Fut>(method: Method, path: impl Into<String>, operation_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        let handler: HandlerFn = Arc::new(move |args| Box::pin(handler(args)));
        Self {
            method,
            path: path.into(),
            operation_id: operation_id.into(),
            signature: Signature::new(),
            handler,
            response_model: None,
            projection: Projection::None,
            status: StatusCode::OK,
            summary: None,
            description: None,
            tags: Vec::new(),
        }
    }

    /// A `GET` endpoint.
    pub fn get<F, Fut>(path: impl Into<String>, operation_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        Self::new(Method::GET, path, operation_id, handler)
    }

    /// A `POST` endpoint.
    pub fn post<F, Fut>(path: impl Into<String>, operation_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        Self::new(Method::POST, path, operation_id, handler)
    }

    /// A `PUT` endpoint.
    pub fn put<F, Fut>(path: impl Into<String>, operation_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        Self::new(Method::PUT, path, operation_id, handler)
    }

    /// Declares one input.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.signature = self.signature.param(param);
        self
    }

    /// Reshapes replies through `model`.
    #[must_use]
    pub fn response_model(mut self, model: ResponseModel) -> Self {
        self.response_model = Some(model);
        self
    }

    /// Keeps only these top-level fields of the reply.
    #[must_use]
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::include(fields);
        self
    }

    /// Drops these top-level fields from the reply.
    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::exclude(fields);
        self
    }

    /// Sets the success status code.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the OpenAPI summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the OpenAPI description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an OpenAPI tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the operation ID.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the declared inputs.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the response model.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseModel> {
        self.response_model.as_ref()
    }

    /// Returns the success status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Runs the handler.
    pub(crate) fn call(&self, args: Arguments) -> HandlerFuture {
        (self.handler)(args)
    }

    /// Applies the response model and projection to a reply body.
    pub fn render(&self, body: &Value) -> Result<Value, ApiError> {
        let shaped = match &self.response_model {
            Some(model) => model.shape(body)?,
            None => body.clone(),
        };
        Ok(project(&shaped, &self.projection))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation_id", &self.operation_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
