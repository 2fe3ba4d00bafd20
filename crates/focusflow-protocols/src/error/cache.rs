//! Cache store errors.

use thiserror::Error;

/// Failure of the local cache store.
///
/// Callers of the coordinator never see this: a failed read is a miss and a
/// failed write is dropped.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Corrupt entry: {0}")]
    Corrupt(String),
}
