//! Command handlers for the engram CLI.

use std::process::ExitCode;

use crate::errors::Error;
use crate::memory::MemoryService;
use crate::memory_types::RecallAge;
use crate::output::*;

/// Commands supported by the engram CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Save a memory to a collection
    Save {
        /// Name of the collection (created on first use)
        collection: String,

        /// The memory text to store
        text: String,
    },
    /// Search a collection by meaning
    Search {
        /// Name of the collection to search
        collection: String,

        /// What you're looking for
        query: String,

        /// Maximum number of results (default: 5)
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },
    /// List collections with memory counts and last update time
    Collections,
    /// Recall a random memory from a collection
    Recall {
        /// Name of the collection
        collection: String,

        /// Draw from newest, oldest, or any memories
        #[arg(long, value_enum, default_value = "any")]
        age: RecallAge,
    },
}

/// Execute a CLI command.
pub fn execute(command: &Commands, service: &MemoryService, json: bool) -> Result<ExitCode, Error> {
    match command {
        Commands::Save { collection, text } => handle_save(service, collection, text, json),
        Commands::Search {
            collection,
            query,
            top_k,
        } => handle_search(service, collection, query, *top_k, json),
        Commands::Collections => handle_collections(service, json),
        Commands::Recall { collection, age } => handle_recall(service, collection, *age, json),
    }
}

fn handle_save(
    service: &MemoryService,
    collection: &str,
    text: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let saved = service.save_memory(collection, text)?;
    if json {
        print_json(&SaveResponse {
            status: "saved".to_string(),
            id: saved.id,
            collection: saved.collection,
            created_at: saved.created_at,
        });
    } else {
        println!("Saved memory #{} to collection '{}'", saved.id, saved.collection);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search(
    service: &MemoryService,
    collection: &str,
    query: &str,
    top_k: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let hits = service.search_memory(collection, query, Some(top_k))?;
    if json {
        print_json(&SearchResponse { results: hits });
    } else if hits.is_empty() {
        println!("No memories found in collection '{}'", collection);
    } else {
        for hit in &hits {
            println!("[{} | score {:.3}]", hit.created_at, hit.score);
            println!("{}\n", hit.text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_collections(service: &MemoryService, json: bool) -> Result<ExitCode, Error> {
    let summaries = service.list_collections()?;
    if json {
        print_json(&CollectionsResponse {
            collections: summaries,
        });
    } else if summaries.is_empty() {
        println!("No collections yet");
    } else {
        for summary in &summaries {
            let noun = if summary.count == 1 { "memory" } else { "memories" };
            println!(
                "{}: {} {} (last updated: {})",
                summary.name, summary.count, noun, summary.last_updated
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_recall(
    service: &MemoryService,
    collection: &str,
    age: RecallAge,
    json: bool,
) -> Result<ExitCode, Error> {
    let memory = service.recall_random(collection, age)?;
    if json {
        print_json(&RecallResponse { memory });
    } else {
        match memory {
            Some(memory) => {
                println!("[{}]", memory.created_at);
                println!("{}", memory.text);
            }
            None => println!("No memories found in collection '{}'", collection),
        }
    }
    Ok(ExitCode::SUCCESS)
}
