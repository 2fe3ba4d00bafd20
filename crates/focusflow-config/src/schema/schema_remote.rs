//! Remote rewriting service configuration.

use serde::{Deserialize, Serialize};

/// Remote service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL the `/simplify` and `/simplify-batch` endpoints hang off.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Health endpoint. Defaults to `/health` on the base URL's origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,

    /// Liveness probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Timeout for simplify calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_url: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}
