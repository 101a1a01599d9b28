//! HTTP server and request dispatch.
//!
//! # Architecture
//!
//! - a TCP listener accepting connections until shutdown
//! - one HTTP/1.1 connection task per client
//! - [`Server::dispatch`] turning one buffered request into one response:
//!   route, bind, invoke, shape, project, and translate errors
//!
//! The in-memory test client drives [`Server::dispatch`] directly, so every
//! behaviour except socket handling is exercised without a network.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use emporium_core::{ApiError, DomainException, RequestId, REQUEST_ID_HEADER};
use emporium_extract::ExtractionContext;
use emporium_router::{RouteLookup, Router};
use emporium_telemetry::{log_request_complete, log_request_error, log_request_rejected, log_request_start};

use crate::config::ServerConfig;
use crate::endpoint::{Endpoint, Reply};
use crate::exception::ExceptionHandlers;
use crate::health::HealthCheck;
use crate::openapi::build_document;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Path of the built-in liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Path of the generated API document.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Two endpoints share an operation ID.
    #[error("duplicate operation id: {0}")]
    DuplicateOperation(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Emporium HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
    endpoints: IndexMap<String, Arc<Endpoint>>,
    exceptions: ExceptionHandlers,
    health: HealthCheck,
    openapi: Value,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Looks up an endpoint by operation ID.
    #[must_use]
    pub fn endpoint(&self, operation_id: &str) -> Option<&Endpoint> {
        self.endpoints.get(operation_id).map(AsRef::as_ref)
    }

    /// Iterates over endpoints in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values().map(AsRef::as_ref)
    }

    /// Returns the health reporter.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Returns the generated OpenAPI document.
    #[must_use]
    pub fn openapi(&self) -> &Value {
        &self.openapi
    }

    /// Runs the server until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` fires, then waits
    /// up to the shutdown timeout for open connections.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        tracing::info!(
            addr = %local,
            endpoints = self.endpoints.len(),
            "Server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            active = tracker.active_connections(),
            "Waiting for connections to close"
        );

        tokio::select! {
            _ = tracker.wait_for_shutdown() => tracing::info!("All connections closed"),
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "Shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        let mut draining = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => return result,
                _ = shutdown.recv(), if !draining => {
                    tracing::debug!(%remote_addr, "draining connection for shutdown");
                    conn.as_mut().graceful_shutdown();
                    draining = true;
                }
            }
        }
    }

    /// Buffers the body under the size and time limits, then dispatches.
    async fn handle_request(&self, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        let (parts, body) = req.into_parts();
        let limit = self.config.upload_limits().max_body_size;

        let collected = tokio::time::timeout(
            self.config.request_timeout(),
            Limited::new(body, limit).collect(),
        )
        .await;

        let failure = match collected {
            Ok(Ok(collected)) => {
                let req = Request::from_parts(parts, collected.to_bytes());
                return Ok(self.dispatch(req).await);
            }
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => ApiError::http(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Request body exceeds {limit} bytes"),
            ),
            Ok(Err(e)) => ApiError::http(
                StatusCode::BAD_REQUEST,
                format!("Failed to read request body: {e}"),
            ),
            Err(_) => ApiError::http(StatusCode::REQUEST_TIMEOUT, "Request body collection timed out"),
        };

        let start = Instant::now();
        let request_id = request_id_of(&parts.headers);
        let response = self.error_response(failure, &request_id);
        Ok(finish(response, &request_id, start))
    }

    /// Handles one buffered request.
    ///
    /// Every response carries an `x-request-id` header, reusing a valid
    /// incoming one.
    pub async fn dispatch(&self, req: Request<Bytes>) -> HttpResponse {
        let start = Instant::now();
        let request_id = request_id_of(req.headers());

        let response = match tokio::time::timeout(
            self.config.request_timeout(),
            self.route(req, &request_id),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => self.error_response(
                ApiError::http(StatusCode::GATEWAY_TIMEOUT, "Handler execution timed out"),
                &request_id,
            ),
        };

        finish(response, &request_id, start)
    }

    async fn route(&self, req: Request<Bytes>, request_id: &RequestId) -> HttpResponse {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();

        if parts.method == Method::GET {
            if path == HEALTH_PATH {
                log_request_start!(request_id, parts.method, path, "health");
                return json_response(StatusCode::OK, HeaderMap::new(), &json!(self.health.status()));
            }
            if path == OPENAPI_PATH && self.config.openapi_enabled() {
                log_request_start!(request_id, parts.method, path, "openapi");
                return json_response(StatusCode::OK, HeaderMap::new(), &self.openapi);
            }
        }

        match self.router.match_route(&parts.method, &path) {
            RouteLookup::Found(route) => {
                let Some(endpoint) = self.endpoints.get(route.operation_id()) else {
                    return self.error_response(
                        ApiError::internal(format!("no endpoint for operation {}", route.operation_id())),
                        request_id,
                    );
                };
                log_request_start!(request_id, parts.method, path, endpoint.operation_id());

                let ctx = ExtractionContext::new(
                    parts.method,
                    parts.uri,
                    parts.headers,
                    body,
                    route.into_params(),
                );
                match self.invoke(endpoint, &ctx).await {
                    Ok(response) => response,
                    Err(error) => self.error_response(error, request_id),
                }
            }
            RouteLookup::MethodNotAllowed(allowed) => {
                log_request_start!(request_id, parts.method, path, "-");
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let error = ApiError::http(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
                    .with_header(ALLOW.as_str(), &allow);
                self.error_response(error, request_id)
            }
            RouteLookup::NotFound => {
                log_request_start!(request_id, parts.method, path, "-");
                self.error_response(ApiError::not_found("Not Found"), request_id)
            }
        }
    }

    async fn invoke(&self, endpoint: &Endpoint, ctx: &ExtractionContext) -> Result<HttpResponse, ApiError> {
        let args = endpoint
            .signature()
            .bind(ctx, self.config.upload_limits())
            .await?;
        let (body, status, headers) = endpoint.call(args).await?.into_parts();
        let rendered = endpoint.render(&body)?;
        Ok(json_response(
            status.unwrap_or_else(|| endpoint.status_code()),
            headers,
            &rendered,
        ))
    }

    /// Translates an error into its response, consulting the exception
    /// handlers for domain exceptions, and logs it.
    fn error_response(&self, error: ApiError, request_id: &RequestId) -> HttpResponse {
        if let ApiError::Domain(exception) = &error {
            if let Some(reply) = self.exceptions.handle(exception) {
                return domain_response(exception, reply);
            }
        }

        let status = error.status_code();
        if status.is_server_error() {
            log_request_error!(request_id, error.error_code(), error);
        } else {
            log_request_rejected!(request_id, error.error_code(), error);
        }
        json_response(status, error.headers(), &error.to_body())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints.len())
            .field("exceptions", &self.exceptions)
            .finish_non_exhaustive()
    }
}

fn request_id_of(headers: &HeaderMap) -> RequestId {
    RequestId::from_header(headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()))
}

fn domain_response(exception: &DomainException, reply: Reply) -> HttpResponse {
    let (body, status, headers) = reply.into_parts();
    let status = status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    tracing::debug!(kind = exception.kind(), status = status.as_u16(), "rendered domain exception");
    json_response(status, headers, &body)
}

fn finish(mut response: HttpResponse, request_id: &RequestId, start: Instant) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    log_request_complete!(request_id, response.status().as_u16(), duration_ms);
    response
}

fn json_response(status: StatusCode, headers: HeaderMap, body: &Value) -> HttpResponse {
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialise response body");
            Bytes::from_static(br#"{"detail":"Internal Server Error"}"#)
        }
    };
    let mut response = Response::new(Full::new(bytes));
    *response.status_mut() = status;
    response.headers_mut().extend(headers);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Builder for a [`Server`].
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    endpoints: Vec<Endpoint>,
    exceptions: ExceptionHandlers,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers an endpoint. Routes match in registration order.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Registers several endpoints.
    #[must_use]
    pub fn endpoints(mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// Registers a handler for one kind of domain exception.
    #[must_use]
    pub fn exception_handler<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&DomainException) -> Reply + Send + Sync + 'static,
    {
        self.exceptions.register(kind, handler);
        self
    }

    /// Builds the server and its API document.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::DuplicateOperation`] if two endpoints share an
    /// operation ID.
    pub fn build(self) -> Result<Server, ServerError> {
        let mut router = Router::new();
        let mut endpoints = IndexMap::with_capacity(self.endpoints.len());

        for endpoint in self.endpoints {
            let id = endpoint.operation_id().to_string();
            if endpoints.contains_key(&id) {
                return Err(ServerError::DuplicateOperation(id));
            }
            router.add_route(endpoint.method().clone(), endpoint.path(), id.clone());
            endpoints.insert(id, Arc::new(endpoint));
        }

        let openapi = build_document(
            self.config.service_name(),
            self.config.service_version(),
            endpoints.values().map(AsRef::as_ref),
        );
        let health = HealthCheck::new(self.config.service_name(), self.config.service_version());

        Ok(Server {
            config: self.config,
            router,
            endpoints,
            exceptions: self.exceptions,
            health,
            openapi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::{FieldSpec, FieldType};
    use emporium_extract::{Arguments, ParamSpec};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn empty(_args: Arguments) -> Result<Reply, ApiError> {
        Ok(Reply::new(json!({})))
    }

    async fn read_user(args: Arguments) -> Result<Reply, ApiError> {
        let user_id: String = args.get("user_id")?;
        Ok(Reply::new(json!({ "user_id": user_id })))
    }

    async fn read_item(args: Arguments) -> Result<Reply, ApiError> {
        let item_id: i64 = args.get("item_id")?;
        if item_id == 7 {
            return Err(ApiError::not_found("Item not found").with_header("X-Error", "There goes my error"));
        }
        Ok(Reply::new(json!({ "item_id": item_id, "tax": 1.5 })))
    }

    async fn read_unicorn(args: Arguments) -> Result<Reply, ApiError> {
        let name: String = args.get("name")?;
        Err(ApiError::domain("UnicornException", name))
    }

    async fn read_dragons(_args: Arguments) -> Result<Reply, ApiError> {
        Err(ApiError::domain("DragonException", "smaug"))
    }

    async fn slow(_args: Arguments) -> Result<Reply, ApiError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(Reply::new(json!({})))
    }

    fn server() -> Server {
        Server::builder()
            .endpoint(
                Endpoint::get("/users/{user_id}", "read_user", read_user)
                    .param(ParamSpec::path(FieldSpec::new("user_id", FieldType::String))),
            )
            .endpoint(
                Endpoint::get("/items/{item_id}", "read_item", read_item)
                    .param(ParamSpec::path(FieldSpec::new("item_id", FieldType::Integer).gt(0.0)))
                    .exclude(["tax"]),
            )
            .endpoint(
                Endpoint::get("/unicorns/{name}", "read_unicorn", read_unicorn)
                    .param(ParamSpec::path(FieldSpec::new("name", FieldType::String))),
            )
            .endpoint(Endpoint::get("/dragons", "read_dragons", read_dragons))
            .endpoint(Endpoint::get("/slow", "slow", slow))
            .exception_handler("UnicornException", |exc| {
                Reply::new(json!({ "message": format!("Oops! {} did something.", exc.subject()) }))
                    .with_status(StatusCode::IM_A_TEAPOT)
            })
            .config(
                ServerConfig::builder()
                    .http_addr("127.0.0.1:0")
                    .request_timeout(Duration::from_millis(50))
                    .shutdown_timeout(Duration::from_millis(100))
                    .build(),
            )
            .build()
            .unwrap()
    }

    fn get(path: &str) -> Request<Bytes> {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let response = server().dispatch(get("/users/me")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(body_json(response).await, json!({"user_id": "me"}));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let id = "0190a3c2-0000-7000-8000-000000000001";
        let req = Request::builder()
            .uri("/users/me")
            .header(REQUEST_ID_HEADER, id)
            .body(Bytes::new())
            .unwrap();
        let response = server().dispatch(req).await;
        assert_eq!(response.headers()[REQUEST_ID_HEADER], id);
    }

    #[tokio::test]
    async fn test_projection_applied() {
        let response = server().dispatch(get("/items/3")).await;
        assert_eq!(body_json(response).await, json!({"item_id": 3}));
    }

    #[tokio::test]
    async fn test_binding_error_is_422() {
        let response = server().dispatch(get("/items/0")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"][0]["loc"], json!(["path", "item_id"]));
        assert_eq!(body["detail"][0]["type"], "greater_than");
    }

    #[tokio::test]
    async fn test_not_found_with_header() {
        let response = server().dispatch(get("/items/7")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-error"], "There goes my error");
        assert_eq!(body_json(response).await, json!({"detail": "Item not found"}));
    }

    #[tokio::test]
    async fn test_unmatched_path() {
        let response = server().dispatch(get("/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"detail": "Not Found"}));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/users/me")
            .body(Bytes::new())
            .unwrap();
        let response = server().dispatch(req).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_domain_exception_handled() {
        let response = server().dispatch(get("/unicorns/yolo")).await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("yolo"));
    }

    #[tokio::test]
    async fn test_unhandled_domain_exception_is_500() {
        let response = server().dispatch(get("/dragons")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"detail": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn test_handler_timeout() {
        let response = server().dispatch(get("/slow")).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_builtin_endpoints() {
        let server = server();
        let health = body_json(server.dispatch(get(HEALTH_PATH)).await).await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["service"], "emporium");

        let doc = body_json(server.dispatch(get(OPENAPI_PATH)).await).await;
        assert!(doc["paths"]["/users/{user_id}"]["get"].is_object());
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        let result = Server::builder()
            .endpoint(Endpoint::get("/a", "same", empty))
            .endpoint(Endpoint::get("/b", "same", empty))
            .build();
        assert!(matches!(result, Err(ServerError::DuplicateOperation(ref id)) if id == "same"));
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let server = Server::builder()
            .config(ServerConfig::builder().http_addr("not-an-address").build())
            .build()
            .unwrap();
        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn test_serve_over_tcp_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(server().serve(listener, shutdown.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.contains(r#"{"user_id":"42"}"#));

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_oversize_body_over_tcp() {
        let server = Server::builder()
            .endpoint(Endpoint::post("/echo", "echo", empty))
            .config(
                ServerConfig::builder()
                    .upload_limits(emporium_extract::UploadLimits::new().max_body_size(4))
                    .build(),
            )
            .build()
            .unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789",
            )
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 413"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
