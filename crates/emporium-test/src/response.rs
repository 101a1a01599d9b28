//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::error::TestError;

/// A buffered response with helpers for assertions.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Buffers an HTTP response.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match; the message includes the body.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let Some(actual) = self.header_str(name) else {
            panic!("header '{name}' not found");
        };
        assert_eq!(actual, expected.as_ref(), "header '{name}' mismatch");
        self
    }

    /// Asserts that the JSON body equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or doesn't match.
    #[track_caller]
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected, "JSON body mismatch"),
            Err(e) => panic!("body is not JSON: {e}"),
        }
        self
    }

    /// Asserts a JSON field addressed by a dotted path such as
    /// `detail.0.loc`.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    #[track_caller]
    pub fn assert_json_field(&self, path: &str, expected: &Value) -> &Self {
        let json = match self.json_value() {
            Ok(json) => json,
            Err(e) => panic!("body is not JSON: {e}"),
        };
        let Some(actual) = json_path(&json, path) else {
            panic!("JSON path '{path}' not found in: {json}");
        };
        assert_eq!(actual, expected, "JSON field '{path}' mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) if current.is_array() => current.get(index)?,
            _ => current.get(segment)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_response(status: u16, body: &str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        TestResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn test_status() {
        let response = create_response(201, "{}");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.status_code(), 201);
        assert!(response.is_success());
        response.assert_status(StatusCode::CREATED);
    }

    #[test]
    fn test_header() {
        let response = create_response(200, "{}");
        assert_eq!(response.content_type(), Some("application/json"));
        response.assert_header("Content-Type", "application/json");
    }

    #[test]
    fn test_json() {
        let response = create_response(200, r#"{"name":"Foo","price":35.4}"#);
        let value: Value = response.json().unwrap();
        assert_eq!(value["name"], "Foo");
        response.assert_json_eq(&json!({"name": "Foo", "price": 35.4}));
    }

    #[test]
    fn test_json_field_path() {
        let response = create_response(
            422,
            r#"{"detail":[{"loc":["path","item_id"],"type":"int_parsing"}]}"#,
        );
        response.assert_json_field("detail.0.loc.1", &json!("item_id"));
        response.assert_json_field("detail.0.type", &json!("int_parsing"));
    }

    #[test]
    #[should_panic(expected = "expected status 200 OK")]
    fn test_assert_status_mismatch() {
        create_response(404, "{}").assert_status(StatusCode::OK);
    }

    #[test]
    fn test_text_and_invalid_json() {
        let response = create_response(200, "plain");
        assert_eq!(response.text().unwrap(), "plain");
        assert!(matches!(response.json_value(), Err(TestError::Json(_))));
    }

    #[tokio::test]
    async fn test_from_http() {
        let response = http::Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(http_body_util::Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let response = TestResponse::from_http(response).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_ref(), b"{}");
    }
}
