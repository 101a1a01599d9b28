//! Extraction error types.
//!
//! These cover transport-level faults that stop binding before any field can
//! be validated: an oversize body, a broken multipart stream, a failed spool
//! write. Field-level problems are reported as
//! [`FieldError`](emporium_core::FieldError)s instead.

use std::fmt;

use emporium_core::ApiError;
use http::StatusCode;
use thiserror::Error;

/// Request channel a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSource {
    /// Path template segment (e.g. `/items/{item_id}`)
    Path,
    /// Query string
    Query,
    /// HTTP header
    Header,
    /// `Cookie` header entry
    Cookie,
    /// JSON request body
    Body,
    /// Form field (urlencoded or a multipart text part)
    Form,
    /// Multipart file part
    File,
}

impl ExtractionSource {
    /// Returns the location prefix used in error reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::Form => "form",
            Self::File => "file",
        }
    }

    /// Returns the OpenAPI `in` value for sources documented as parameters.
    #[must_use]
    pub fn openapi_location(self) -> Option<&'static str> {
        match self {
            Self::Path | Self::Query | Self::Header | Self::Cookie => Some(self.as_str()),
            Self::Body | Self::Form | Self::File => None,
        }
    }

    /// Returns true for sources whose failures are binding errors rather
    /// than body validation errors.
    #[must_use]
    pub fn is_textual(self) -> bool {
        !matches!(self, Self::Body)
    }
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error that stops extraction before fields are validated.
///
/// # Example
///
/// ```rust
/// use emporium_extract::ExtractionError;
/// use http::StatusCode;
///
/// let err = ExtractionError::payload_too_large(1024, 2048);
/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
/// assert!(err.to_string().contains("2048"));
/// ```
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The body or an uploaded file exceeds its limit.
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit.
        max: usize,
        /// Observed size (a lower bound for streamed uploads).
        actual: usize,
    },

    /// More file parts than allowed.
    #[error("too many files: max {max}")]
    TooManyFiles {
        /// Configured limit.
        max: usize,
    },

    /// The multipart body could not be parsed.
    #[error("malformed multipart body: {0}")]
    MalformedMultipart(String),

    /// Writing or reading a spooled upload failed.
    #[error("upload spool failure: {0}")]
    Spool(#[from] std::io::Error),
}

impl ExtractionError {
    /// Creates a payload-too-large error.
    #[must_use]
    pub fn payload_too_large(max: usize, actual: usize) -> Self {
        Self::PayloadTooLarge { max, actual }
    }

    /// Creates a malformed-multipart error.
    #[must_use]
    pub fn malformed(details: impl fmt::Display) -> Self {
        Self::MalformedMultipart(details.to_string())
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } | Self::TooManyFiles { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::MalformedMultipart(_) => StatusCode::BAD_REQUEST,
            Self::Spool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::TooManyFiles { .. } => "TOO_MANY_FILES",
            Self::MalformedMultipart(_) => "MALFORMED_MULTIPART",
            Self::Spool(_) => "UPLOAD_SPOOL_FAILED",
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Spool(io) => ApiError::internal_with_source("upload spool failure", io),
            other => ApiError::http(other.status_code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_too_large_error() {
        let err = ExtractionError::payload_too_large(1024, 2048);
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_malformed_multipart_is_bad_request() {
        let err = ExtractionError::malformed("missing boundary");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert!(api.to_body()["detail"]
            .as_str()
            .unwrap()
            .contains("missing boundary"));
    }

    #[test]
    fn test_spool_failure_is_internal() {
        let err: ExtractionError = std::io::Error::other("disk full").into();
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_body()["detail"], "Internal Server Error");
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Path.to_string(), "path");
        assert_eq!(ExtractionSource::Query.to_string(), "query");
        assert_eq!(ExtractionSource::Cookie.to_string(), "cookie");
        assert_eq!(ExtractionSource::File.to_string(), "file");
    }

    #[test]
    fn test_openapi_location() {
        assert_eq!(ExtractionSource::Header.openapi_location(), Some("header"));
        assert_eq!(ExtractionSource::Form.openapi_location(), None);
        assert!(ExtractionSource::Form.is_textual());
        assert!(!ExtractionSource::Body.is_textual());
    }
}
