//! Collection bookkeeping and derived summaries.
//!
//! The memory rows are the single source of truth: summaries are computed
//! with a GROUP BY at read time, so counts and timestamps can never drift
//! from the rows actually present. The `collections` side table only records
//! names touched by `ensure_collection`; listing never reads it.

use rusqlite::{params, Result as SqliteResult};
use serde::Serialize;

use super::{now_rfc3339, Database, Error, Result};

/// Summary of one collection, derived from its memory rows.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    /// Number of memories in the collection.
    pub count: u64,
    /// Latest created_at among the collection's memories.
    pub last_updated: String,
}

impl Database {
    /// Create bookkeeping for a collection name if absent.
    ///
    /// Idempotent: never errors for an already-existing name.
    pub fn ensure_collection(&self, name: &str) -> Result<()> {
        let created_at = now_rfc3339();
        self.conn().execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, &created_at],
        )?;
        Ok(())
    }

    /// List collections with counts and last-update timestamps, ordered by
    /// name for deterministic output.
    ///
    /// A collection appears iff at least one memory references its name.
    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT collection, COUNT(*), MAX(created_at)
            FROM memories
            GROUP BY collection
            ORDER BY collection ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CollectionSummary {
                name: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
                last_updated: row.get(2)?,
            })
        })?;

        let summaries: SqliteResult<Vec<CollectionSummary>> = rows.collect();
        summaries.map_err(Error::from)
    }
}
