//! Cache-first routing between the cache, the remote service and the fallback.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use focusflow_config::SimplifierConfig;
use focusflow_protocols::{
    BatchItem, BatchResult, CacheKey, CacheStore, Grade, RemoteSimplifier, SimplifyOutcome,
};

use crate::fallback::FallbackSimplifier;
use crate::precompute::{self, PrecomputeHandle};

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

/// Coordinator tuning.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Items per remote call when pre-caching.
    pub batch_size: usize,
    /// Wait between remote calls of a precompute job.
    pub precompute_pacing: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            precompute_pacing: Duration::from_millis(1500),
        }
    }
}

impl From<&SimplifierConfig> for CoordinatorOptions {
    fn from(config: &SimplifierConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            precompute_pacing: Duration::from_millis(config.precompute_pacing_ms),
        }
    }
}

/// Outcome of [`Coordinator::pre_cache`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreCacheReport {
    /// Whether the remote answered the probe.
    pub available: bool,
    /// Chunks of at most `batch_size` items handed to `pre_cache_batch`.
    pub chunks: usize,
    /// Cache entries written.
    pub written: usize,
}

/// Decides, per text, between cache, remote and fallback.
///
/// Cache failures never surface: a failed read is a miss, a failed write is
/// logged. Remote failures resolve to fallback text, which is never cached.
/// Concurrent writers to one key race and the last write wins.
#[derive(Clone)]
pub struct Coordinator {
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteSimplifier>,
    fallback: FallbackSimplifier,
    options: CoordinatorOptions,
}

/// Misses sharing one normalized text, sent to the remote once.
struct MissGroup {
    key: CacheKey,
    item: BatchItem,
    indices: Vec<usize>,
}

impl Coordinator {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        remote: Arc<dyn RemoteSimplifier>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            cache,
            remote,
            fallback: FallbackSimplifier::new(),
            options,
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn remote(&self) -> &Arc<dyn RemoteSimplifier> {
        &self.remote
    }

    pub async fn probe(&self) -> bool {
        self.remote.probe().await
    }

    /// Cache read that treats store errors as a miss.
    pub(crate) async fn lookup(&self, key: &CacheKey) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(text)) => {
                debug!(key = %key, "Cache hit");
                Some(text)
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Presence check that does not count as a use.
    pub(crate) async fn is_cached(&self, key: &CacheKey) -> bool {
        match self.cache.contains(key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                false
            }
        }
    }

    /// Cache write that logs and swallows store errors.
    pub(crate) async fn store(&self, key: &CacheKey, text: &str) -> bool {
        match self.cache.put(key, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Simplify a single text.
    pub async fn simplify_one(&self, text: &str, grade: Grade, page_id: &str) -> SimplifyOutcome {
        let key = CacheKey::new(text, grade);
        if let Some(cached) = self.lookup(&key).await {
            return SimplifyOutcome::cached(cached);
        }

        match self.remote.simplify_one(text, grade, page_id).await {
            Ok(simplified) => {
                self.store(&key, &simplified).await;
                SimplifyOutcome::remote(simplified)
            }
            Err(e) => {
                warn!(
                    grade = %grade,
                    page_id,
                    error = %e,
                    "Remote simplify failed, using fallback"
                );
                SimplifyOutcome::fallback(self.fallback.simplify(text, grade))
            }
        }
    }

    /// Simplify many texts with at most one remote call.
    ///
    /// Returns one result per input item, in input order.
    pub async fn simplify_batch(
        &self,
        items: &[BatchItem],
        grade: Grade,
        page_id: &str,
    ) -> Vec<BatchResult> {
        let mut results: Vec<Option<BatchResult>> = vec![None; items.len()];
        let mut groups: Vec<MissGroup> = Vec::new();
        let mut group_by_key: HashMap<CacheKey, usize> = HashMap::new();

        for (index, item) in items.iter().enumerate() {
            let key = CacheKey::new(&item.text, grade);
            if let Some(&group) = group_by_key.get(&key) {
                groups[group].indices.push(index);
                continue;
            }
            if let Some(cached) = self.lookup(&key).await {
                results[index] = Some(BatchResult {
                    id: item.id.clone(),
                    text: cached,
                    from_cache: true,
                });
                continue;
            }
            group_by_key.insert(key.clone(), groups.len());
            groups.push(MissGroup {
                key,
                item: item.clone(),
                indices: vec![index],
            });
        }

        if groups.is_empty() {
            debug!(items = items.len(), grade = %grade, "Batch fully served from cache");
            return results.into_iter().flatten().collect();
        }

        // Remote ids are group positions, so repeated caller ids cannot collide.
        let request: Vec<BatchItem> = groups
            .iter()
            .enumerate()
            .map(|(position, g)| BatchItem::new(position.to_string(), g.item.text.clone()))
            .collect();
        debug!(
            items = items.len(),
            misses = request.len(),
            grade = %grade,
            page_id,
            "Sending batch to remote"
        );

        let mut returned: HashMap<String, String> = match self
            .remote
            .simplify_batch(&request, grade, page_id)
            .await
        {
            Ok(returned) => returned
                .into_iter()
                .filter(|item| !item.text.is_empty())
                .map(|item| (item.id, item.text))
                .collect(),
            Err(e) => {
                warn!(
                    misses = request.len(),
                    grade = %grade,
                    page_id,
                    error = %e,
                    "Remote batch failed, using fallback"
                );
                HashMap::new()
            }
        };

        for (position, group) in groups.into_iter().enumerate() {
            let text = match returned.remove(&position.to_string()) {
                Some(text) => {
                    self.store(&group.key, &text).await;
                    text
                }
                None => {
                    debug!(id = %group.item.id, "No remote result for item, using fallback");
                    self.fallback.simplify(&group.item.text, grade)
                }
            };
            for index in group.indices {
                results[index] = Some(BatchResult {
                    id: items[index].id.clone(),
                    text: text.clone(),
                    from_cache: false,
                });
            }
        }

        results.into_iter().flatten().collect()
    }

    /// Whether a simplification for `(text, grade)` is already stored.
    pub async fn check_cache(&self, text: &str, grade: Grade) -> bool {
        self.is_cached(&CacheKey::new(text, grade)).await
    }

    /// Warm the cache for the items not already in it with one remote call.
    ///
    /// Returns the number of entries written. Failures are logged only.
    pub async fn pre_cache_batch(
        &self,
        items: &[BatchItem],
        grade: Grade,
        page_id: &str,
    ) -> usize {
        let mut seen: HashSet<CacheKey> = HashSet::new();
        let mut pending: Vec<(CacheKey, BatchItem)> = Vec::new();
        for item in items {
            let key = CacheKey::new(&item.text, grade);
            if !seen.insert(key.clone()) || self.is_cached(&key).await {
                continue;
            }
            pending.push((key, item.clone()));
        }

        if pending.is_empty() {
            debug!(items = items.len(), grade = %grade, "Pre-cache batch already cached");
            return 0;
        }

        let request: Vec<BatchItem> = pending
            .iter()
            .enumerate()
            .map(|(position, (_, item))| BatchItem::new(position.to_string(), item.text.clone()))
            .collect();
        let returned = match self.remote.simplify_batch(&request, grade, page_id).await {
            Ok(returned) => returned,
            Err(e) => {
                warn!(
                    items = request.len(),
                    grade = %grade,
                    page_id,
                    error = %e,
                    "Pre-cache batch failed"
                );
                return 0;
            }
        };

        let by_id: HashMap<String, String> = returned
            .into_iter()
            .filter(|item| !item.text.is_empty())
            .map(|item| (item.id, item.text))
            .collect();

        let mut written = 0;
        for (position, (key, _)) in pending.iter().enumerate() {
            if let Some(text) = by_id.get(&position.to_string()) {
                if self.store(key, text).await {
                    written += 1;
                }
            }
        }
        debug!(written, grade = %grade, page_id, "Pre-cache batch stored");
        written
    }

    /// Probe, then warm the cache in `batch_size` chunks issued concurrently.
    pub async fn pre_cache(
        &self,
        items: &[BatchItem],
        grade: Grade,
        page_id: &str,
    ) -> PreCacheReport {
        if !self.remote.probe().await {
            info!(grade = %grade, page_id, "Remote unavailable, skipping pre-cache");
            return PreCacheReport::default();
        }

        let chunks: Vec<&[BatchItem]> = items.chunks(self.options.batch_size.max(1)).collect();
        let written = join_all(
            chunks
                .iter()
                .map(|chunk| self.pre_cache_batch(chunk, grade, page_id)),
        )
        .await
        .into_iter()
        .sum();

        info!(
            items = items.len(),
            chunks = chunks.len(),
            written,
            grade = %grade,
            page_id,
            "Pre-cache finished"
        );
        PreCacheReport {
            available: true,
            chunks: chunks.len(),
            written,
        }
    }

    /// Start warming the cache for every grade except `completed_grade`.
    pub fn spawn_precompute(
        &self,
        text: impl Into<String>,
        completed_grade: Grade,
        page_id: impl Into<String>,
    ) -> PrecomputeHandle {
        precompute::spawn(self.clone(), text.into(), completed_grade, page_id.into())
    }
}
