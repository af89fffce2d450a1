//! Core memory service struct combining the embedding client and persistence.

use std::time::Duration;

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::errors::Error;
use crate::sqlite::Database;

/// Number of search results returned when the caller does not specify top_k.
pub const DEFAULT_TOP_K: usize = 5;

/// Memory service combining remote embedding generation and persistence.
///
/// Shared by concurrent callers: all operations take `&self` and the service
/// is `Send + Sync`. The embedding request, the only long-latency step, is
/// always issued before the storage lock is taken, so one caller's slow
/// embedding call never blocks another's storage access.
pub struct MemoryService {
    pub(crate) db: Database,
    pub(crate) embedder: EmbeddingClient,
}

impl MemoryService {
    /// Initialize a memory service from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Database path contains path traversal sequences (e.g., "../")
    /// - Parent directory cannot be canonicalized
    /// - Database cannot be opened, or was created with a different
    ///   vector dimension than configured
    pub fn new(config: &Config) -> Result<Self, Error> {
        use std::path::Component;

        // Path traversal guard: reject parent directory components (works on all platforms)
        for component in config.database_path.components() {
            if matches!(component, Component::ParentDir) {
                return Err(Error::Config(
                    "Invalid database path: contains '..' which may escape the intended directory"
                        .to_string(),
                ));
            }
        }

        // Validate parent directory exists and is accessible
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::canonicalize(parent).map_err(|e| {
                    Error::Config(format!(
                        "Invalid database path: parent directory not accessible: {}",
                        e
                    ))
                })?;
            }
        }

        let db = Database::open(&config.database_path, config.embed_dims)?;
        let embedder = EmbeddingClient::new(
            &config.embed_url,
            &config.embed_model,
            config.embed_dims,
            Duration::from_secs(config.embed_timeout_secs),
        );
        Ok(MemoryService { db, embedder })
    }

    /// Reject empty or whitespace-only input before any I/O happens.
    pub(crate) fn validate_field(name: &str, value: &str) -> Result<(), Error> {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("{name} must not be empty")));
        }
        Ok(())
    }
}
