//! JSON response types and formatting for CLI output.

use serde::Serialize;

use crate::memory_types::{RecalledMemory, SearchHit};
use crate::sqlite::CollectionSummary;

/// Response for a successful save.
#[derive(Serialize)]
pub struct SaveResponse {
    pub status: String,
    pub id: i64,
    pub collection: String,
    pub created_at: String,
}

/// Response for search results.
#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// Response for listing collections.
#[derive(Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

/// Response for random recall.
#[derive(Serialize)]
pub struct RecallResponse {
    pub memory: Option<RecalledMemory>,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}
