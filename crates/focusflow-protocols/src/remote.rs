//! Remote rewriting service protocol definitions.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::grade::Grade;
use crate::types::BatchItem;

/// Core trait for remote simplification services.
///
/// Implementations never retry; a failed call is reported once and the
/// caller decides what to do with it.
#[async_trait]
pub trait RemoteSimplifier: Send + Sync {
    /// Returns the client ID.
    fn id(&self) -> &str;

    /// Liveness check. Any failure is reported as `false`.
    async fn probe(&self) -> bool;

    /// Send later calls to the service rooted at `base_url`.
    ///
    /// Clients without a configurable endpoint accept and ignore it.
    fn set_base_url(&self, _base_url: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    /// Rewrite a single text.
    async fn simplify_one(
        &self,
        text: &str,
        grade: Grade,
        page_id: &str,
    ) -> Result<String, RemoteError>;

    /// Rewrite several texts in one call.
    ///
    /// Results correlate to `items` by `id`; their order is unspecified.
    async fn simplify_batch(
        &self,
        items: &[BatchItem],
        grade: Grade,
        page_id: &str,
    ) -> Result<Vec<BatchItem>, RemoteError>;
}
