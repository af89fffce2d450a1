//! SQLite backend for engram memory storage.
//!
//! This module provides:
//! - `Database`: connection, schema, and transactional inserts
//! - `Memory`: data structure for stored memories
//! - `vector`: BLOB conversion and cosine similarity
//! - `search`: similarity ranking and random recall
//! - `collections`: collection bookkeeping and derived summaries

pub mod collections;
pub mod search;
pub mod vector;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub use self::collections::CollectionSummary;

/// A single memory record with an optional similarity score.
#[derive(Debug, Clone)]
pub struct Memory {
    pub id: i64,
    pub collection: String,
    pub text: String,

    /// Cosine similarity against the query vector (-1.0 to 1.0, higher =
    /// closer). Only set on records returned from a similarity query.
    pub similarity: Option<f64>,
    pub created_at: String,
}

/// Error types for SQLite operations.
#[derive(Debug)]
pub enum Error {
    Sqlite(String),
    InvalidBlobSize { expected: usize, actual: usize },
    MismatchedDimensions { expected: usize, actual: usize },
    EmptyVector,
    InvalidEmbedding(String),
    InvalidLimit(String),
    DimensionsPinned { stored: usize, configured: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Sqlite(msg) => write!(f, "Database error: {}", msg),
            Error::InvalidBlobSize { expected, actual } => {
                write!(
                    f,
                    "Invalid BLOB size: expected {} bytes, got {} bytes",
                    expected, actual
                )
            }
            Error::MismatchedDimensions { expected, actual } => {
                write!(
                    f,
                    "Mismatched dimensions: expected {} dimensions, got {} dimensions",
                    expected, actual
                )
            }
            Error::EmptyVector => write!(f, "Cannot compute similarity with empty vector"),
            Error::InvalidEmbedding(msg) => write!(f, "Invalid embedding: {}", msg),
            Error::InvalidLimit(msg) => write!(f, "Invalid limit: {}", msg),
            Error::DimensionsPinned { stored, configured } => {
                write!(
                    f,
                    "Store was created with {} dimensions, cannot open with {}; \
                     changing dimensions requires a fresh store",
                    stored, configured
                )
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// SQLite database backend for engram.
///
/// Access is serialized through a single mutex-guarded connection: at most
/// one insert is in flight at a time, and every insert commits as one
/// transaction so a reader never observes a row without its vector.
/// Embedding calls happen before the lock is taken (see the service layer).
pub struct Database {
    conn: Mutex<Connection>,
    dims: usize,
}

/// Initialize database schema.
fn create_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS memories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_collection ON memories(collection);

        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS store_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Record the vector dimension on first open, reject mismatches after.
fn pin_dimensions(conn: &Connection, dims: usize) -> Result<()> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = 'embedding_dims'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(value) => {
            let stored_dims: usize = value.parse().map_err(|_| {
                Error::Sqlite(format!("corrupt embedding_dims metadata: '{value}'"))
            })?;
            if stored_dims != dims {
                return Err(Error::DimensionsPinned {
                    stored: stored_dims,
                    configured: dims,
                });
            }
        }
        None => {
            conn.execute(
                "INSERT INTO store_meta (key, value) VALUES ('embedding_dims', ?1)",
                params![dims.to_string()],
            )?;
        }
    }
    Ok(())
}

/// Current UTC time as RFC 3339. Micros + Z keeps the strings fixed-width so
/// MAX() and ORDER BY compare timestamps correctly.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    /// Open or create a SQLite database at the given path.
    ///
    /// Initializes the schema if the database is new and pins the vector
    /// dimension on first open.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened, schema initialization
    /// fails, or the store was created with a different dimension.
    pub fn open(path: &Path, dims: usize) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        create_schema(&mut conn)?;
        pin_dimensions(&conn, dims)?;
        Ok(Self {
            conn: Mutex::new(conn),
            dims,
        })
    }

    /// Vector dimension this store was opened with.
    pub fn dims(&self) -> usize {
        self.dims
    }

    // A poisoned lock means another caller panicked mid-operation; the
    // connection itself is still usable, so recover it.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a new memory with embedding, assigning the next id.
    ///
    /// The row commits as a single transaction: either the full memory is
    /// visible or none of it is.
    ///
    /// # Errors
    ///
    /// Returns error if the embedding has invalid dimensions or the write
    /// fails.
    pub fn insert(&self, collection: &str, text: &str, embedding: &[f32]) -> Result<Memory> {
        let blob = vector::vec_to_blob(embedding, self.dims)?;
        let created_at = now_rfc3339();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO memories (collection, text, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![collection, text, &blob, &created_at],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Memory {
            id,
            collection: collection.to_string(),
            text: text.to_string(),
            similarity: None,
            created_at,
        })
    }

    /// Insert a memory with an explicit timestamp (for testing).
    #[cfg(test)]
    pub(crate) fn insert_with_time(
        &self,
        collection: &str,
        text: &str,
        embedding: &[f32],
        created_at: &str,
    ) -> Result<i64> {
        let blob = vector::vec_to_blob(embedding, self.dims)?;

        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO memories (collection, text, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![collection, text, &blob, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
