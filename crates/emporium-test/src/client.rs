//! Test client for in-memory HTTP testing.

use std::sync::Arc;

use bytes::Bytes;
use emporium_server::Server;
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::request::{MultipartBody, TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// A client that drives a [`Server`] without binding a socket.
///
/// Requests go through [`Server::dispatch`], so routing, binding, error
/// rendering and request-ID handling behave exactly as over TCP.
///
/// # Example
///
/// ```ignore
/// use emporium_test::TestClient;
///
/// let client = TestClient::new(server);
/// let response = client.get("/items/5").query("q", "somequery").send().await;
/// assert_eq!(response.status_code(), 200);
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    server: Arc<Server>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a built server.
    pub fn new(server: Server) -> Self {
        Self::from_shared(Arc::new(server))
    }

    /// Wraps a server that is shared with other clients.
    pub fn from_shared(server: Arc<Server>) -> Self {
        Self {
            server,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the wrapped server.
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.server.dispatch(request.into_http_request()?).await;
        TestResponse::from_http(response).await
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("endpoints", &self.server.endpoints().count())
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, mut builder: TestRequestBuilder) -> Self {
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Appends a header value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Appends a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Adds a cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.cookie(name, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as form-urlencoded.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, form: MultipartBody) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built or the body could not be
    /// read; use [`try_send`](Self::try_send) to handle those cases.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::{ApiError, FieldSpec, FieldType};
    use emporium_extract::{Arguments, ParamSpec};
    use emporium_server::{Endpoint, Reply};
    use http::StatusCode;
    use serde_json::{json, Value};

    async fn read_item(args: Arguments) -> Result<Reply, ApiError> {
        let item_id: i64 = args.get("item_id")?;
        let q: Option<String> = args.get("q")?;
        Ok(Reply::new(json!({ "item_id": item_id, "q": q })))
    }

    async fn create_item(args: Arguments) -> Result<Reply, ApiError> {
        let item: Value = args.get("item")?;
        Ok(Reply::new(item))
    }

    async fn read_token(args: Arguments) -> Result<Reply, ApiError> {
        let token: Option<String> = args.get("x_token")?;
        let ads_id: Option<String> = args.get("ads_id")?;
        Ok(Reply::new(json!({ "x_token": token, "ads_id": ads_id })))
    }

    fn client() -> TestClient {
        let server = Server::builder()
            .endpoint(
                Endpoint::get("/items/{item_id}", "read_item", read_item)
                    .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::Integer)))
                    .param(ParamSpec::query(FieldSpec::new("q", FieldType::String).optional())),
            )
            .endpoint(
                Endpoint::post("/items/", "create_item", create_item)
                    .param(ParamSpec::body(FieldSpec::new("item", FieldType::Any))),
            )
            .endpoint(
                Endpoint::get("/token", "read_token", read_token)
                    .param(ParamSpec::header(FieldSpec::new("x_token", FieldType::String).optional()))
                    .param(ParamSpec::cookie(FieldSpec::new("ads_id", FieldType::String).optional())),
            )
            .build()
            .unwrap();
        TestClient::new(server)
    }

    #[tokio::test]
    async fn test_get_with_query() {
        let response = client().get("/items/5").query("q", "somequery").send().await;
        response
            .assert_status(StatusCode::OK)
            .assert_json_eq(&json!({"item_id": 5, "q": "somequery"}));
        assert!(response.header_str("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_binding_error() {
        let response = client().get("/items/foo").send().await;
        response
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
            .assert_json_field("detail.0.loc", &json!(["path", "item_id"]));
    }

    #[tokio::test]
    async fn test_post_json() {
        let response = client()
            .post("/items/")
            .json(&json!({"name": "Foo"}))
            .send()
            .await;
        response.assert_json_eq(&json!({"name": "Foo"}));
    }

    #[tokio::test]
    async fn test_header_and_cookie() {
        let response = client()
            .get("/token")
            .header("X-Token", "coneofsilence")
            .cookie("ads_id", "abc")
            .send()
            .await;
        response.assert_json_eq(&json!({"x_token": "coneofsilence", "ads_id": "abc"}));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = client().with_default_header("X-Token", "default");
        let response = client.get("/token").send().await;
        response.assert_json_field("x_token", &json!("default"));
    }

    #[tokio::test]
    async fn test_custom_method_not_allowed() {
        let response = client().request(Method::PATCH, "/items/5").send().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let result = client().get("/items/5").header("X-Token", "bad\nvalue").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
