//! SQLite cache store implementation.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::debug;

use focusflow_protocols::cache::{CacheEntry, CacheKey, CacheStore, EvictionPolicy};
use focusflow_protocols::error::CacheError;
use focusflow_protocols::Grade;

use crate::schema::init_schema;

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;

/// SQLite-backed simplification cache.
///
/// Durable across restarts when opened on a file. Reads bump a per-store
/// access sequence, which drives [`EvictionPolicy::Lru`].
pub struct SqliteCacheStore {
    conn: Connection,
    policy: EvictionPolicy,
    access_seq: AtomicI64,
}

impl SqliteCacheStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, CacheError> {
        Self::in_memory_with_policy(EvictionPolicy::Unbounded).await
    }

    pub async fn in_memory_with_policy(policy: EvictionPolicy) -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Self::init(conn, policy).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Self::open_with_policy(path, EvictionPolicy::Unbounded).await
    }

    pub async fn open_with_policy(
        path: impl AsRef<Path>,
        policy: EvictionPolicy,
    ) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::Connection(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(&path)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        debug!(path = %path.display(), ?policy, "Opened SQLite cache");
        Self::init(conn, policy).await
    }

    async fn init(conn: Connection, policy: EvictionPolicy) -> Result<Self, CacheError> {
        let last_seq = conn
            .call(|conn| {
                init_schema(conn)?;
                let seq: i64 = conn.query_row(
                    "SELECT COALESCE(MAX(access_seq), 0) FROM simplifications",
                    [],
                    |row| row.get(0),
                )?;
                Ok(seq)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))?;

        Ok(Self {
            conn,
            policy,
            access_seq: AtomicI64::new(last_seq),
        })
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    fn next_seq(&self) -> i64 {
        self.access_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch the full stored record without touching its access time.
    pub async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let key = key.as_str().to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT key, text, grade, stored_at, accessed_at
                         FROM simplifications WHERE key = ?1",
                        [&key],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, i64>(2)?,
                                row.get::<_, String>(3)?,
                                row.get::<_, String>(4)?,
                            ))
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))?;

        let Some((key, text, grade, stored_at, accessed_at)) = row else {
            return Ok(None);
        };

        let grade = Grade::try_from(grade).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        Ok(Some(CacheEntry {
            key,
            text,
            grade,
            stored_at: parse_timestamp(&stored_at)?,
            last_accessed: parse_timestamp(&accessed_at)?,
        }))
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CacheError::Corrupt(format!("timestamp {:?}: {}", value, e)))
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    fn id(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let key = key.as_str().to_string();
        let seq = self.next_seq();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                let text: Option<String> = conn
                    .query_row(
                        "SELECT text FROM simplifications WHERE key = ?1",
                        [&key],
                        |row| row.get(0),
                    )
                    .optional()?;

                if text.is_some() {
                    conn.execute(
                        "UPDATE simplifications SET access_seq = ?1, accessed_at = ?2
                         WHERE key = ?3",
                        params![seq, now, key],
                    )?;
                }
                Ok(text)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))
    }

    async fn put(&self, key: &CacheKey, text: &str) -> Result<(), CacheError> {
        let key_str = key.as_str().to_string();
        let grade = key.grade().value();
        let text = text.to_string();
        let seq = self.next_seq();
        let now = Utc::now().to_rfc3339();
        let max_entries = self.policy.max_entries();

        let evicted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT INTO simplifications
                        (key, text, grade, stored_at, accessed_at, access_seq)
                     VALUES (?1, ?2, ?3, ?4, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        text = excluded.text,
                        grade = excluded.grade,
                        stored_at = excluded.stored_at,
                        accessed_at = excluded.accessed_at,
                        access_seq = excluded.access_seq",
                    params![key_str, text, grade, now, seq],
                )?;

                let evicted = match max_entries {
                    Some(max) => tx.execute(
                        "DELETE FROM simplifications WHERE key IN (
                            SELECT key FROM simplifications
                            ORDER BY access_seq DESC
                            LIMIT -1 OFFSET ?1
                        )",
                        params![max as i64],
                    )?,
                    None => 0,
                };

                tx.commit()?;
                Ok(evicted)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))?;

        if evicted > 0 {
            debug!(evicted, "Evicted least recently read cache entries");
        }
        Ok(())
    }

    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let key = key.as_str().to_string();
        self.conn
            .call(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM simplifications WHERE key = ?1)",
                    [&key],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM simplifications", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM simplifications", [])?;
                Ok(())
            })
            .await
            .map_err(|e| CacheError::Query(e.to_string()))
    }
}
