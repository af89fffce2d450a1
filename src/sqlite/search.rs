//! Similarity ranking and random recall.

use rand::seq::SliceRandom;
use rusqlite::Result as SqliteResult;

use crate::memory_types::RecallAge;

use super::{vector, Database, Error, Memory};

pub type Result<T> = std::result::Result<T, Error>;

/// Maximum allowed limit for query operations.
pub const MAX_QUERY_LIMIT: usize = 10_000;

/// How many newest/oldest rows age-weighted recall draws from.
const RECALL_WINDOW: usize = 20;

/// Validate a result limit is within acceptable bounds.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::InvalidLimit(
            "Limit must be greater than 0".to_string(),
        ));
    }
    if limit > MAX_QUERY_LIMIT {
        return Err(Error::InvalidLimit(format!(
            "Limit {} exceeds maximum allowed ({})",
            limit, MAX_QUERY_LIMIT
        )));
    }
    Ok(())
}

impl Database {
    /// Rank a collection's memories by cosine similarity to a query vector.
    ///
    /// Scans every row in the collection (exact, brute-force; query cost is
    /// linear in collection size), sorts by similarity descending with ties
    /// broken by ascending id, and returns at most `top_k` results. A
    /// nonexistent or empty collection yields an empty vec, not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the limit is invalid, the query embedding has invalid
    /// dimensions, or the read fails.
    pub fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<Memory>> {
        validate_limit(top_k)?;

        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, collection, text, created_at, embedding
            FROM memories
            WHERE collection = ?1
            "#,
        )?;

        let rows = stmt.query_map([collection], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Vec<u8>>(4)?,
            ))
        })?;

        let mut memories: Vec<Memory> = Vec::new();
        for row_result in rows {
            let (id, collection, text, created_at, blob) = row_result?;
            let stored_embedding = vector::blob_to_vec(&blob, self.dims())?;
            let similarity = Some(vector::cosine_similarity(
                query_embedding,
                &stored_embedding,
            )?);

            memories.push(Memory {
                id,
                collection,
                text,
                similarity,
                created_at,
            });
        }

        memories.sort_by(|a, b| {
            b.similarity
                .unwrap_or(0.0)
                .partial_cmp(&a.similarity.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        memories.truncate(top_k);
        Ok(memories)
    }

    /// Pick one random memory from a collection, optionally age-weighted.
    ///
    /// `Recent` and `Old` draw uniformly from the 20 newest or oldest rows;
    /// `Any` is fully random. An empty collection yields `None`.
    pub fn recall_random(&self, collection: &str, age: RecallAge) -> Result<Option<Memory>> {
        let sql = match age {
            RecallAge::Recent => {
                "SELECT id, collection, text, created_at FROM memories \
                 WHERE collection = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
            }
            RecallAge::Old => {
                "SELECT id, collection, text, created_at FROM memories \
                 WHERE collection = ?1 ORDER BY created_at ASC, id ASC LIMIT ?2"
            }
            RecallAge::Any => {
                "SELECT id, collection, text, created_at FROM memories \
                 WHERE collection = ?1 ORDER BY RANDOM() LIMIT ?2"
            }
        };
        let window = match age {
            RecallAge::Any => 1,
            RecallAge::Recent | RecallAge::Old => RECALL_WINDOW,
        };

        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params![collection, window as i64], |row| {
            Ok(Memory {
                id: row.get(0)?,
                collection: row.get(1)?,
                text: row.get(2)?,
                similarity: None,
                created_at: row.get(3)?,
            })
        })?;

        let candidates: SqliteResult<Vec<Memory>> = rows.collect();
        let candidates = candidates?;

        let mut rng = rand::thread_rng();
        Ok(candidates.choose(&mut rng).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{orthogonal_embeddings, test_db, test_embedding};
    use super::*;

    #[test]
    fn test_validate_limit_zero() {
        assert!(validate_limit(0).is_err());
    }

    #[test]
    fn test_validate_limit_too_large() {
        assert!(validate_limit(MAX_QUERY_LIMIT + 1).is_err());
    }

    #[test]
    fn test_validate_limit_valid() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(5000).is_ok());
    }

    #[test]
    fn test_query_ranks_by_similarity() {
        let db = test_db();
        let embedding_a = test_embedding(1.0);
        let embedding_b = test_embedding(-1.0);

        let id_a = db.insert("notes", "match A", &embedding_a).unwrap().id;
        let _id_b = db.insert("notes", "match B", &embedding_b).unwrap().id;

        let results = db.query("notes", &embedding_a, 5).unwrap();
        assert_eq!(results.len(), 2);

        let top = &results[0];
        assert_eq!(top.id, id_a);
        assert!((top.similarity.unwrap() - 1.0).abs() < 1e-6);
        assert!(top.similarity.unwrap() > results[1].similarity.unwrap());
    }

    #[test]
    fn test_query_ties_break_by_ascending_id() {
        let db = test_db();
        let embedding = test_embedding(0.7);

        let first = db.insert("notes", "inserted first", &embedding).unwrap().id;
        let second = db.insert("notes", "inserted second", &embedding).unwrap().id;

        let results = db.query("notes", &embedding, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, first);
        assert_eq!(results[1].id, second);
    }

    #[test]
    fn test_query_truncates_to_top_k() {
        let db = test_db();
        let embedding = test_embedding(0.5);

        for i in 0..10 {
            db.insert("notes", &format!("item {}", i), &embedding)
                .unwrap();
        }

        let results = db.query("notes", &embedding, 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_query_returns_all_when_fewer_than_top_k() {
        let db = test_db();
        let embedding = test_embedding(0.5);

        db.insert("notes", "only one", &embedding).unwrap();

        let results = db.query("notes", &embedding, 10).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_query_unknown_collection_is_empty_not_error() {
        let db = test_db();
        let results = db.query("never-written", &test_embedding(0.5), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_query_collection_isolation() {
        let db = test_db();
        let embedding = test_embedding(0.5);

        for i in 0..3 {
            db.insert("a", &format!("a {}", i), &embedding).unwrap();
        }
        for i in 0..2 {
            db.insert("b", &format!("b {}", i), &embedding).unwrap();
        }

        let results = db.query("a", &embedding, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.collection == "a"));
    }

    #[test]
    fn test_query_zero_magnitude_stored_vector_scores_zero() {
        let db = test_db();
        let zero = vec![0.0f32; 4];
        db.insert("notes", "zero vector", &zero).unwrap();

        let results = db.query("notes", &test_embedding(1.0), 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].similarity.unwrap(), 0.0);
    }

    #[test]
    fn test_query_negative_similarity_ranks_last() {
        let db = test_db();
        let (pos, _) = orthogonal_embeddings();
        let neg: Vec<f32> = pos.iter().map(|x| -x).collect();

        db.insert("notes", "positive", &pos).unwrap();
        let id_neg = db.insert("notes", "negative", &neg).unwrap().id;

        let results = db.query("notes", &pos, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].id, id_neg);
        assert!((results[1].similarity.unwrap() - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_recall_random_empty_collection() {
        let db = test_db();
        let result = db.recall_random("nothing-here", RecallAge::Any).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_recall_random_any_returns_a_stored_memory() {
        let db = test_db();
        let embedding = test_embedding(0.5);
        db.insert("notes", "alpha", &embedding).unwrap();
        db.insert("notes", "beta", &embedding).unwrap();

        let memory = db.recall_random("notes", RecallAge::Any).unwrap().unwrap();
        assert!(memory.text == "alpha" || memory.text == "beta");
        assert_eq!(memory.collection, "notes");
    }

    #[test]
    fn test_recall_random_respects_collection() {
        let db = test_db();
        let embedding = test_embedding(0.5);
        db.insert("a", "from a", &embedding).unwrap();

        assert!(db.recall_random("b", RecallAge::Any).unwrap().is_none());
    }

    #[test]
    fn test_recall_old_excludes_rows_outside_window() {
        let db = test_db();
        let embedding = test_embedding(0.5);

        // 21 rows: the newest falls outside the 20-row "old" window.
        for i in 0..21 {
            db.insert_with_time(
                "notes",
                &format!("memory {}", i),
                &embedding,
                &format!("2024-01-01T00:00:{:02}.000000Z", i),
            )
            .unwrap();
        }

        for _ in 0..20 {
            let memory = db.recall_random("notes", RecallAge::Old).unwrap().unwrap();
            assert_ne!(memory.text, "memory 20");
        }
    }

    #[test]
    fn test_recall_recent_excludes_rows_outside_window() {
        let db = test_db();
        let embedding = test_embedding(0.5);

        for i in 0..21 {
            db.insert_with_time(
                "notes",
                &format!("memory {}", i),
                &embedding,
                &format!("2024-01-01T00:00:{:02}.000000Z", i),
            )
            .unwrap();
        }

        for _ in 0..20 {
            let memory = db
                .recall_random("notes", RecallAge::Recent)
                .unwrap()
                .unwrap();
            assert_ne!(memory.text, "memory 0");
        }
    }
}
