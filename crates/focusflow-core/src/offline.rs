//! Remote stand-in for running without a rewriting service.

use async_trait::async_trait;

use focusflow_protocols::error::RemoteError;
use focusflow_protocols::{BatchItem, Grade, RemoteSimplifier};

/// Always unavailable, so every request is answered by the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl OfflineRemote {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteSimplifier for OfflineRemote {
    fn id(&self) -> &str {
        "offline"
    }

    async fn probe(&self) -> bool {
        false
    }

    async fn simplify_one(
        &self,
        _text: &str,
        _grade: Grade,
        _page_id: &str,
    ) -> Result<String, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn simplify_batch(
        &self,
        _items: &[BatchItem],
        _grade: Grade,
        _page_id: &str,
    ) -> Result<Vec<BatchItem>, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use focusflow_protocols::{CacheKey, CacheStore, OutcomeSource};

    use crate::testing::{grade, memory_cache};
    use crate::{Coordinator, CoordinatorOptions};

    #[tokio::test]
    async fn test_offline_remote_refuses() {
        let remote = OfflineRemote::new();
        assert_eq!(remote.id(), "offline");
        assert!(!remote.probe().await);
        assert!(matches!(
            remote.simplify_one("text", grade(3), "p").await,
            Err(RemoteError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_offline_coordinator_falls_back_without_caching() {
        let cache = memory_cache();
        let coordinator = Coordinator::new(
            cache.clone(),
            Arc::new(OfflineRemote),
            CoordinatorOptions::default(),
        );
        let text = "The committee subsequently approved the proposal. It was late.";

        let outcome = coordinator.simplify_one(text, grade(3), "p").await;
        assert_eq!(outcome.source, OutcomeSource::Fallback);
        assert!(!cache.contains(&CacheKey::new(text, grade(3))).await.unwrap());
    }
}
