//! Memory service data types.

use serde::{Deserialize, Serialize};

/// Identity of a newly saved memory. The stored vector is deliberately not
/// returned; callers only need the record's identity and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct SavedMemory {
    /// Monotonically increasing identifier assigned by the store.
    pub id: i64,
    /// Collection the memory was saved to.
    pub collection: String,
    /// Insertion timestamp (RFC 3339).
    pub created_at: String,
}

/// One ranked search result. Raw vectors and internal ids are not exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Stored memory text.
    pub text: String,
    /// Cosine similarity against the query (-1.0 to 1.0, higher = closer).
    pub score: f64,
    /// When the memory was saved (RFC 3339).
    pub created_at: String,
}

/// A memory returned by random recall.
#[derive(Debug, Clone, Serialize)]
pub struct RecalledMemory {
    pub text: String,
    pub created_at: String,
}

/// Age weighting for random recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallAge {
    /// Fully random across the collection.
    Any,
    /// Draw from the newest memories.
    Recent,
    /// Draw from the oldest memories.
    Old,
}
