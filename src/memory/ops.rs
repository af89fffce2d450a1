//! Save, search, list, and recall operations for the memory service.

use tracing::debug;

use crate::errors::Error;
use crate::memory_types::{RecallAge, RecalledMemory, SavedMemory, SearchHit};
use crate::sqlite::CollectionSummary;

use super::service::{MemoryService, DEFAULT_TOP_K};

impl MemoryService {
    #[must_use = "handle the error or the save may be lost"]
    /// Save a memory to a named collection, creating the collection on first
    /// use.
    ///
    /// The text is embedded before any storage lock is taken; the row then
    /// commits as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Collection or text is empty (rejected before any network call)
    /// - The embedding service fails or returns the wrong dimension
    /// - The durable write fails
    pub fn save_memory(&self, collection: &str, text: &str) -> Result<SavedMemory, Error> {
        Self::validate_field("collection", collection)?;
        Self::validate_field("text", text)?;

        let embedding = self.embedder.embed(text)?;

        self.db.ensure_collection(collection)?;
        let memory = self.db.insert(collection, text, &embedding)?;
        debug!(id = memory.id, collection = %memory.collection, "saved memory");

        Ok(SavedMemory {
            id: memory.id,
            collection: memory.collection,
            created_at: memory.created_at,
        })
    }

    #[must_use = "handle the error or results may be lost"]
    /// Search a collection by semantic similarity to a query.
    ///
    /// Returns up to `top_k` hits (default 5) sorted by cosine similarity,
    /// highest first. A nonexistent or empty collection yields an empty vec,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Collection or query is empty, or top_k is zero (rejected before any
    ///   network call)
    /// - The embedding service fails or returns the wrong dimension
    /// - The read fails
    pub fn search_memory(
        &self,
        collection: &str,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchHit>, Error> {
        Self::validate_field("collection", collection)?;
        Self::validate_field("query", query)?;

        let top_k = top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(Error::Validation(
                "top_k must be a positive integer".to_string(),
            ));
        }

        let embedding = self.embedder.embed(query)?;
        let memories = self.db.query(collection, &embedding, top_k)?;

        Ok(memories
            .into_iter()
            .map(|m| SearchHit {
                text: m.text,
                score: m.similarity.unwrap_or(0.0),
                created_at: m.created_at,
            })
            .collect())
    }

    #[must_use = "handle the error or results may be lost"]
    /// List collections with memory counts and last-update timestamps,
    /// ordered by name.
    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>, Error> {
        Ok(self.db.list_collections()?)
    }

    #[must_use = "handle the error or the result may be lost"]
    /// Retrieve one random memory from a collection, optionally weighted by
    /// age. An empty or nonexistent collection yields `None`.
    pub fn recall_random(
        &self,
        collection: &str,
        age: RecallAge,
    ) -> Result<Option<RecalledMemory>, Error> {
        Self::validate_field("collection", collection)?;

        let memory = self.db.recall_random(collection, age)?;
        Ok(memory.map(|m| RecalledMemory {
            text: m.text,
            created_at: m.created_at,
        }))
    }
}
