//! Error types for Emporium.
//!
//! [`ApiError`] is the single error type that crosses the boundary between
//! request handling and the HTTP layer. Every variant knows its status code,
//! any extra response headers, and the JSON body it renders to.
//!
//! | Variant | Status | Body |
//! |---|---|---|
//! | `Binding` | 422 | `{"detail": [FieldError, ...]}` |
//! | `Validation` | 422 | `{"detail": [FieldError, ...]}` |
//! | `NotFound` | 404 | `{"detail": "..."}` |
//! | `Http` | as given | `{"detail": "..."}` |
//! | `Domain` | 500 unless a handler is registered | `{"detail": "Internal Server Error"}` |
//! | `Internal` | 500 | `{"detail": "Internal Server Error"}` |

use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// One segment of an error location: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    /// Position inside a list.
    Index(usize),
    /// Object key or parameter name.
    Key(String),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<&str> for LocSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for LocSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for LocSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single failed field.
///
/// `source` names the request channel the value came from (`path`, `query`,
/// `body`, ...) and is only set by the binding layer. `path` locates the
/// field inside that channel. On the wire both are joined into `loc`, and the
/// dotted `field` path (`item.tax`, `items.0.price`) is emitted alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    source: Option<String>,
    path: Vec<LocSegment>,
    msg: String,
    kind: String,
    input: Option<Value>,
}

impl FieldError {
    /// Creates an error with the violated constraint `kind` and a message.
    #[must_use]
    pub fn new(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            source: None,
            path: Vec::new(),
            msg: msg.into(),
            kind: kind.into(),
            input: None,
        }
    }

    /// A required value was absent.
    #[must_use]
    pub fn missing() -> Self {
        Self::new("missing", "Field required")
    }

    /// Prepends a location segment.
    #[must_use]
    pub fn at(mut self, segment: impl Into<LocSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Records the request channel the value was read from.
    #[must_use]
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches the offending raw value.
    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Returns the violated constraint, e.g. `greater_than`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the human-readable reason.
    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Returns the request channel, if known.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the offending raw value, if recorded.
    #[must_use]
    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    /// Returns the location inside the request channel.
    #[must_use]
    pub fn path(&self) -> &[LocSegment] {
        &self.path
    }

    /// Returns the full location, source first.
    #[must_use]
    pub fn loc(&self) -> Vec<LocSegment> {
        self.source
            .iter()
            .map(|s| LocSegment::Key(s.clone()))
            .chain(self.path.iter().cloned())
            .collect()
    }

    /// Returns the dotted field path, e.g. `item.tax`.
    #[must_use]
    pub fn field_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.input.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("FieldError", len)?;
        state.serialize_field("loc", &self.loc())?;
        state.serialize_field("field", &self.field_path())?;
        state.serialize_field("msg", &self.msg)?;
        state.serialize_field("type", &self.kind)?;
        if let Some(input) = &self.input {
            state.serialize_field("input", input)?;
        }
        state.end()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.field_path(), self.msg, self.kind)
    }
}

/// Every failed field of one validation pass, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("{} field error(s)", .0.len())]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding one error.
    #[must_use]
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    /// Adds an error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Appends every error from `other`.
    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Prepends a location segment to every error.
    #[must_use]
    pub fn at(self, segment: impl Into<LocSegment>) -> Self {
        let segment = segment.into();
        Self(self.0.into_iter().map(|e| e.at(segment.clone())).collect())
    }

    /// Tags every error with the request channel it came from.
    #[must_use]
    pub fn from_source(self, source: &str) -> Self {
        Self(self.0.into_iter().map(|e| e.from_source(source)).collect())
    }

    /// Returns `true` if there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Finds the first error for a dotted field path.
    #[must_use]
    pub fn for_field(&self, field_path: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field_path() == field_path)
    }

    /// Converts an accumulated collection into a result.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A named business-rule failure raised by handler code.
///
/// The HTTP rendering is decided by the exception handler registered for
/// `kind`; without one the failure surfaces as a 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} raised for '{subject}'")]
pub struct DomainException {
    kind: String,
    subject: String,
}

impl DomainException {
    /// Creates a new exception of the given kind about `subject`.
    #[must_use]
    pub fn new(kind: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subject: subject.into(),
        }
    }

    /// Returns the exception kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the entity the exception is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Standard error type for request handling.
///
/// # Example
///
/// ```
/// use emporium_core::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::not_found("Item not found").with_header("X-Error", "There goes my error");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.headers().get("x-error").unwrap(), "There goes my error");
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// A raw request value could not satisfy a source-level constraint.
    #[error("request binding failed: {0}")]
    Binding(FieldErrors),

    /// A payload failed its schema.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A lookup missed.
    #[error("not found: {detail}")]
    NotFound {
        /// Message returned to the client.
        detail: String,
        /// Extra response headers.
        headers: HeaderMap,
    },

    /// Any other HTTP-level failure with an explicit status.
    #[error("{status}: {detail}")]
    Http {
        /// Response status.
        status: StatusCode,
        /// Message returned to the client.
        detail: String,
        /// Extra response headers.
        headers: HeaderMap,
    },

    /// A named business-rule failure.
    #[error(transparent)]
    Domain(#[from] DomainException),

    /// A server-side fault. The message and cause are logged, never returned.
    #[error("internal error: {message}")]
    Internal {
        /// Description for the logs.
        message: String,
        /// The underlying cause.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a binding error.
    #[must_use]
    pub fn binding(errors: FieldErrors) -> Self {
        Self::Binding(errors)
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    /// Creates a 404 with the given detail.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Creates an error with an explicit status.
    #[must_use]
    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Creates a domain exception.
    #[must_use]
    pub fn domain(kind: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Domain(DomainException::new(kind, subject))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with its cause.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Adds a response header to a `NotFound` or `Http` error.
    ///
    /// Other variants carry no headers and are returned unchanged. Invalid
    /// header names or values are dropped with a warning.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let parsed = HeaderName::try_from(name)
            .ok()
            .zip(HeaderValue::try_from(value).ok());
        match (&mut self, parsed) {
            (Self::NotFound { headers, .. } | Self::Http { headers, .. }, Some((n, v))) => {
                headers.insert(n, v);
            }
            (Self::NotFound { .. } | Self::Http { .. }, None) => {
                tracing::warn!(header = name, "dropping invalid error header");
            }
            _ => {}
        }
        self
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Binding(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Http { status, .. } => *status,
            Self::Domain(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Binding(_) => "BINDING_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Domain(_) => "DOMAIN_EXCEPTION",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the extra headers to send with the response.
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        match self {
            Self::NotFound { headers, .. } | Self::Http { headers, .. } => headers.clone(),
            _ => HeaderMap::new(),
        }
    }

    /// Returns the collected field errors of a binding or validation error.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Binding(errors) | Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Renders the JSON body returned to the client.
    #[must_use]
    pub fn to_body(&self) -> Value {
        match self {
            Self::Binding(errors) | Self::Validation(errors) => json!({ "detail": errors }),
            Self::NotFound { detail, .. } | Self::Http { detail, .. } => json!({ "detail": detail }),
            Self::Domain(_) | Self::Internal { .. } => json!({ "detail": "Internal Server Error" }),
        }
    }
}
