//! Test doubles shared by the unit tests in this crate.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use focusflow_cache::MemoryCacheStore;
use focusflow_protocols::error::RemoteError;
use focusflow_protocols::{BatchItem, CacheStore, Grade, RemoteSimplifier};

use crate::coordinator::{Coordinator, CoordinatorOptions};

/// One recorded `simplify_one` call.
#[derive(Debug, Clone)]
pub struct OneCall {
    pub text: String,
    pub grade: Grade,
    pub at: Instant,
}

/// Scripted remote: answers `"<text> [g<grade>]"` unless told to fail.
#[derive(Default)]
pub struct ScriptedRemote {
    pub available: Mutex<bool>,
    pub fail_all: Mutex<bool>,
    /// Batch ids the remote silently leaves out of its response.
    pub drop_ids: Mutex<HashSet<String>>,
    pub one_calls: Mutex<Vec<OneCall>>,
    pub batch_calls: Mutex<Vec<Vec<BatchItem>>>,
    pub probes: Mutex<usize>,
    /// Accepted `set_base_url` values, in order.
    pub base_urls: Mutex<Vec<String>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: Mutex::new(true),
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        let remote = Self::new();
        *remote.fail_all.lock() = true;
        remote
    }

    pub fn answer(text: &str, grade: Grade) -> String {
        format!("{} [g{}]", text.trim(), grade)
    }

    pub fn one_call_count(&self) -> usize {
        self.one_calls.lock().len()
    }

    pub fn batch_call_count(&self) -> usize {
        self.batch_calls.lock().len()
    }
}

#[async_trait]
impl RemoteSimplifier for ScriptedRemote {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn probe(&self) -> bool {
        *self.probes.lock() += 1;
        *self.available.lock()
    }

    fn set_base_url(&self, base_url: &str) -> Result<(), RemoteError> {
        if !base_url.starts_with("http") {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        self.base_urls.lock().push(base_url.to_string());
        Ok(())
    }

    async fn simplify_one(
        &self,
        text: &str,
        grade: Grade,
        _page_id: &str,
    ) -> Result<String, RemoteError> {
        self.one_calls.lock().push(OneCall {
            text: text.to_string(),
            grade,
            at: Instant::now(),
        });
        if *self.fail_all.lock() {
            return Err(RemoteError::Status {
                status: 502,
                message: "scripted failure".to_string(),
            });
        }
        Ok(Self::answer(text, grade))
    }

    async fn simplify_batch(
        &self,
        items: &[BatchItem],
        grade: Grade,
        _page_id: &str,
    ) -> Result<Vec<BatchItem>, RemoteError> {
        self.batch_calls.lock().push(items.to_vec());
        if *self.fail_all.lock() {
            return Err(RemoteError::Network("scripted failure".to_string()));
        }
        let dropped = self.drop_ids.lock().clone();
        // Reverse order so callers must correlate by id.
        Ok(items
            .iter()
            .rev()
            .filter(|item| !dropped.contains(&item.id))
            .map(|item| BatchItem::new(item.id.clone(), Self::answer(&item.text, grade)))
            .collect())
    }
}

pub fn grade(value: u8) -> Grade {
    Grade::new(value).unwrap()
}

pub fn memory_cache() -> Arc<MemoryCacheStore> {
    Arc::new(MemoryCacheStore::new())
}

pub fn coordinator(cache: Arc<dyn CacheStore>, remote: Arc<ScriptedRemote>) -> Coordinator {
    Coordinator::new(cache, remote, CoordinatorOptions::default())
}
