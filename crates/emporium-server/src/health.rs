//! The `/health` liveness endpoint.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Body of a `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `"healthy"`: a process that can answer is alive.
    pub status: String,
    /// Service name from the server configuration.
    pub service: String,
    /// Service version from the server configuration.
    pub version: String,
    /// Whole seconds since the server was built.
    pub uptime_seconds: u64,
}

/// Produces [`HealthStatus`] snapshots for one server.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    started: Instant,
}

impl HealthCheck {
    /// Starts the uptime clock for `service` at `version`.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            started: Instant::now(),
        }
    }

    /// Takes a snapshot.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".into(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_identity() {
        let snapshot = HealthCheck::new("emporium", "0.1.0").status();
        assert_eq!(snapshot.status, "healthy");
        assert_eq!(snapshot.service, "emporium");
        assert_eq!(snapshot.version, "0.1.0");
        assert!(snapshot.uptime_seconds < 5);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = HealthCheck::new("storefront", "2.0.0").status();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "storefront");
        assert!(json["uptime_seconds"].is_u64());
    }
}
