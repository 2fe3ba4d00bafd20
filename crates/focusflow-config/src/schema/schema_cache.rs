//! Cache store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which cache store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// SQLite database file. `~` is expanded.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Maximum number of entries before least-recently-read eviction
    /// (0 = unbounded).
    #[serde(default)]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            path: default_cache_path(),
            max_entries: 0,
        }
    }
}

impl CacheConfig {
    /// The database path with a leading `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path.to_string_lossy()).into_owned())
    }
}

fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".focusflow")
        .join("cache.db")
}
