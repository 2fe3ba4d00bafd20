//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
-- One row per (normalized text, grade) fingerprint
CREATE TABLE IF NOT EXISTS simplifications (
    key TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    grade INTEGER NOT NULL,
    stored_at TEXT NOT NULL,
    accessed_at TEXT NOT NULL,
    access_seq INTEGER NOT NULL
);

-- Eviction walks rows oldest-read first
CREATE INDEX IF NOT EXISTS idx_simplifications_access_seq ON simplifications(access_seq);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='simplifications'")
            .unwrap();
        assert!(stmt.exists([]).unwrap());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
