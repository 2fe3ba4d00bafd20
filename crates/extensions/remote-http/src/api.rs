//! Wire types for the rewriting service.

use serde::{Deserialize, Serialize};

use focusflow_protocols::BatchItem;

/// `POST {base}/simplify` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyRequest<'a> {
    pub text: &'a str,
    pub grade: u8,
    pub page_id: &'a str,
}

/// `POST {base}/simplify` reply. Extra fields (`success`, `latency`...) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyResponse {
    pub simplified_text: String,
}

/// `POST {base}/simplify-batch` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyBatchRequest<'a> {
    pub batch: &'a [BatchItem],
    pub grade: u8,
    pub page_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SimplifyBatchResponse {
    pub results: Vec<BatchItem>,
}

/// Error body shape used by the service (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
