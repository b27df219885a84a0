//! Health check types.

use serde::{Deserialize, Serialize};

/// Service liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    /// `"healthy"` when the service is up.
    pub status: String,

    /// Whether the service holds credentials for the upstream catalog.
    #[serde(default)]
    pub nasa_api_configured: bool,
}

impl HealthStatus {
    /// Returns true if the service reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
