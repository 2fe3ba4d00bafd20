//! reqwest-backed [`RemoteSimplifier`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use focusflow_config::RemoteConfig;
use focusflow_protocols::error::RemoteError;
use focusflow_protocols::{BatchItem, Grade, RemoteSimplifier};

use crate::api::{
    ErrorBody, SimplifyBatchRequest, SimplifyBatchResponse, SimplifyRequest, SimplifyResponse,
};

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where requests and health probes go.
#[derive(Debug, Clone)]
struct Endpoints {
    base_url: String,
    health_url: String,
    /// Health URL came from config and survives a base URL change.
    pinned_health: bool,
}

/// Client for the remote rewriting service.
///
/// Every call is attempted exactly once. Clones share endpoints, so a base
/// URL change is seen by every clone.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    endpoints: Arc<RwLock<Endpoints>>,
    probe_timeout: Duration,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Client for `base_url`, probing `/health` on the same origin.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let health_url = derive_health_url(&base_url)?;
        Ok(Self {
            endpoints: Arc::new(RwLock::new(Endpoints {
                base_url,
                health_url,
                pinned_health: false,
            })),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut client = Self::new(config.base_url.clone())?
            .with_probe_timeout(Duration::from_millis(config.probe_timeout_ms))
            .with_request_timeout(Duration::from_secs(config.request_timeout_secs));
        if let Some(health_url) = &config.health_url {
            client = client.with_health_url(health_url.clone());
        }
        Ok(client)
    }

    pub fn with_health_url(self, health_url: impl Into<String>) -> Self {
        {
            let mut endpoints = self.endpoints.write();
            endpoints.health_url = health_url.into();
            endpoints.pinned_health = true;
        }
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        self.endpoints.read().base_url.clone()
    }

    pub fn health_url(&self) -> String {
        self.endpoints.read().health_url.clone()
    }

    /// Re-point the client. In-flight calls finish against the old URL.
    ///
    /// The health URL follows the new origin unless it was set explicitly.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), RemoteError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let health_url = derive_health_url(&base_url)?;

        let mut endpoints = self.endpoints.write();
        if endpoints.base_url == base_url {
            return Ok(());
        }
        info!(from = %endpoints.base_url, to = %base_url, "Remote base URL changed");
        endpoints.base_url = base_url;
        if !endpoints.pinned_health {
            endpoints.health_url = health_url;
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.read().base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.detail)
                .unwrap_or(text);
            warn!(url = %url, status = status.as_u16(), "Remote service returned an error");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout(self.request_timeout.as_secs())
        } else if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl Default for HttpRemoteClient {
    fn default() -> Self {
        Self {
            endpoints: Arc::new(RwLock::new(Endpoints {
                base_url: DEFAULT_BASE_URL.to_string(),
                health_url: "http://localhost:3000/health".to_string(),
                pinned_health: false,
            })),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }
}

/// `/health` on the origin of `base_url`.
///
/// The service mounts its API below a path prefix but serves health at the root.
pub fn derive_health_url(base_url: &str) -> Result<String, RemoteError> {
    let base =
        Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;
    let health = base
        .join("/health")
        .map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;
    Ok(health.to_string())
}

#[async_trait]
impl RemoteSimplifier for HttpRemoteClient {
    fn id(&self) -> &str {
        "http"
    }

    async fn probe(&self) -> bool {
        let health_url = self.health_url();
        let result = self
            .client
            .get(&health_url)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Health probe failed");
                false
            }
            Err(e) => {
                debug!(error = %e, "Health probe unreachable");
                false
            }
        }
    }

    fn set_base_url(&self, base_url: &str) -> Result<(), RemoteError> {
        HttpRemoteClient::set_base_url(self, base_url)
    }

    async fn simplify_one(
        &self,
        text: &str,
        grade: Grade,
        page_id: &str,
    ) -> Result<String, RemoteError> {
        let request = SimplifyRequest {
            text,
            grade: grade.value(),
            page_id,
        };
        let response: SimplifyResponse = self.post_json("simplify", &request).await?;
        Ok(response.simplified_text)
    }

    async fn simplify_batch(
        &self,
        items: &[BatchItem],
        grade: Grade,
        page_id: &str,
    ) -> Result<Vec<BatchItem>, RemoteError> {
        let request = SimplifyBatchRequest {
            batch: items,
            grade: grade.value(),
            page_id,
        };
        let response: SimplifyBatchResponse =
            self.post_json("simplify-batch", &request).await?;
        debug!(
            sent = items.len(),
            received = response.results.len(),
            "Batch simplified"
        );
        Ok(response.results)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
