//! Cache store protocol definitions.
//!
//! The cache maps a fingerprint of `(text, grade)` to the simplified text the
//! remote service produced for it.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CacheError;
use crate::grade::Grade;

/// Core trait for cache stores.
///
/// Concurrent writers to the same key race; the last `put` wins. Entries for
/// one key are interchangeable, so this is accepted.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the store ID.
    fn id(&self) -> &str;

    /// Look up the simplified text for a key.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store (or overwrite) the simplified text for a key.
    async fn put(&self, key: &CacheKey, text: &str) -> Result<(), CacheError>;

    /// Check for a key without counting as a use.
    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Number of stored entries.
    async fn len(&self) -> Result<usize, CacheError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Fingerprint of `(normalized text, grade)`.
///
/// The digest is SHA-256 over the normalized text, so distinct texts sharing a
/// slot is not a practical concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    value: String,
    grade: Grade,
}

impl CacheKey {
    pub fn new(text: &str, grade: Grade) -> Self {
        let normalized = normalize_text(text);
        let digest = Sha256::digest(normalized.as_bytes());
        Self {
            value: format!("{:x}_g{}", digest, grade),
            grade,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Trim and collapse whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A stored simplification, as persisted by durable stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub text: String,
    pub grade: Grade,
    pub stored_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

/// How a store bounds its size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Never evict.
    #[default]
    Unbounded,
    /// Keep at most `max_entries`, dropping the least recently read first.
    Lru { max_entries: usize },
}

impl EvictionPolicy {
    /// `0` means unbounded.
    pub fn from_max_entries(max_entries: usize) -> Self {
        if max_entries == 0 {
            Self::Unbounded
        } else {
            Self::Lru { max_entries }
        }
    }

    pub fn max_entries(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Lru { max_entries } => Some(*max_entries),
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
