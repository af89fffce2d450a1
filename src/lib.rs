//! engram - a semantic memory store for AI agents.
//!
//! Callers write short text fragments into named collections and later
//! retrieve them by meaning rather than literal keyword match. Text is
//! embedded by a remote model server, persisted in SQLite alongside its
//! source text, and ranked by exact cosine similarity at query time.
//! All operations are synchronous (no async/await required) and safe to
//! call from concurrent threads sharing one service.
//!
//! # Example
//!
//! ```no_run
//! use engram::{Config, MemoryService};
//!
//! let config = Config::load().expect("Failed to load configuration");
//! config.ensure_directories().expect("Failed to create data directory");
//! let service = MemoryService::new(&config).expect("Failed to initialize service");
//!
//! // Save a memory; the collection is created on first use
//! let saved = service.save_memory("notes", "JWT tokens expire after 24 hours");
//! match saved {
//!     Ok(memory) => println!("Saved memory #{}", memory.id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//!
//! // Search by meaning
//! let hits = service.search_memory("notes", "things about authentication", None);
//! for hit in hits.unwrap() {
//!     println!("{:.2}: {}", hit.score, hit.text);
//! }
//! ```

pub mod commands;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod memory;
pub mod memory_types;
pub mod output;
pub mod registry;
mod sqlite;

// Re-export public API
pub use config::Config;
pub use embedding::EmbeddingClient;
pub use errors::Error;
pub use sqlite::Error as StorageError;
pub use memory::service::DEFAULT_TOP_K;
pub use memory::MemoryService;
pub use memory_types::{RecallAge, RecalledMemory, SavedMemory, SearchHit};
pub use registry::CommandRegistry;
pub use sqlite::{CollectionSummary, Memory};
