use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response from GET /health.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub api_version: String,
    pub model_version: String,
}

/// Response from GET /.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WelcomeResponse {
    /// Service status, "ok" when healthy
    pub status: String,

    pub service_name: String,

    pub description: String,

    pub api_version: String,

    pub model_version: String,

    /// Public resource paths exposed by the API
    #[serde(default)]
    pub resources: Vec<String>,

    /// Named documentation links
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}
