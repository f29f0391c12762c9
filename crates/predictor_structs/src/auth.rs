use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response from POST /auth/login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests
    pub access_token: String,

    /// Token type, always "bearer" in practice
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Token lifetime in minutes
    pub expires_minutes: Option<u32>,

    /// Scopes granted to the token
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Response from GET /auth/scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScopesResponse {
    /// Scope name to human-readable description
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}
