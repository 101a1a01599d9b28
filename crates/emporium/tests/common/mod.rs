//! Shared helpers for the end-to-end API tests.

use emporium_server::ServerConfig;
use emporium_test::TestClient;

/// Builds the full storefront behind an in-memory test client.
pub fn client() -> TestClient {
    let config = ServerConfig::builder().http_addr("127.0.0.1:0").build();
    TestClient::new(emporium::build_server(config).expect("storefront should build"))
}
