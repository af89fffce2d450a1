//! Command registry: the seam a transport mounts.
//!
//! Maps each operation name to a description, a JSON parameter schema, and a
//! typed handler. Built once at startup, looked up per request. Parameter
//! deserialization failures surface as validation errors, so a transport can
//! forward caller input verbatim.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::Error;
use crate::memory::MemoryService;
use crate::memory_types::RecallAge;

/// One registered operation.
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema describing the operation's parameters.
    pub parameters: Value,
    handler: fn(&MemoryService, Value) -> Result<Value, Error>,
}

/// Registry of the operations the memory service exposes.
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandSpec>,
}

#[derive(Deserialize)]
struct SaveMemoryParams {
    collection: String,
    text: String,
}

#[derive(Deserialize)]
struct SearchMemoryParams {
    collection: String,
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Deserialize)]
struct RecallRandomParams {
    collection: String,
    #[serde(default)]
    age: Option<RecallAge>,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, Error> {
    serde_json::from_value(params).map_err(|e| Error::Validation(format!("invalid parameters: {e}")))
}

fn save_memory(service: &MemoryService, params: Value) -> Result<Value, Error> {
    let params: SaveMemoryParams = parse_params(params)?;
    let saved = service.save_memory(&params.collection, &params.text)?;
    Ok(serde_json::to_value(saved)?)
}

fn search_memory(service: &MemoryService, params: Value) -> Result<Value, Error> {
    let params: SearchMemoryParams = parse_params(params)?;
    let hits = service.search_memory(&params.collection, &params.query, params.top_k)?;
    Ok(json!({ "results": hits }))
}

fn list_collections(service: &MemoryService, _params: Value) -> Result<Value, Error> {
    let summaries = service.list_collections()?;
    Ok(json!({ "collections": summaries }))
}

fn recall_random(service: &MemoryService, params: Value) -> Result<Value, Error> {
    let params: RecallRandomParams = parse_params(params)?;
    let memory = service.recall_random(&params.collection, params.age.unwrap_or(RecallAge::Any))?;
    Ok(json!({ "memory": memory }))
}

impl CommandRegistry {
    /// Build the registry with all supported operations.
    pub fn new() -> Self {
        let specs = [
            CommandSpec {
                name: "save_memory",
                description:
                    "Save a memory to a named collection with semantic embedding. \
                     Creates the collection automatically if it doesn't exist.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "collection": { "type": "string", "description": "Name of the collection" },
                        "text": { "type": "string", "description": "The memory text to store" }
                    },
                    "required": ["collection", "text"]
                }),
                handler: save_memory,
            },
            CommandSpec {
                name: "search_memory",
                description: "Search a memory collection by semantic similarity.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "collection": { "type": "string", "description": "Name of the collection to search" },
                        "query": { "type": "string", "description": "What you're looking for" },
                        "top_k": { "type": "integer", "minimum": 1, "description": "Number of results to return (default 5)" }
                    },
                    "required": ["collection", "query"]
                }),
                handler: search_memory,
            },
            CommandSpec {
                name: "list_collections",
                description: "List all memory collections with their memory counts and last update time.",
                parameters: json!({
                    "type": "object",
                    "properties": {}
                }),
                handler: list_collections,
            },
            CommandSpec {
                name: "recall_random",
                description: "Retrieve a random memory from a collection, optionally weighted by age.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "collection": { "type": "string", "description": "Name of the collection" },
                        "age": { "type": "string", "enum": ["any", "recent", "old"], "description": "Draw from newest, oldest, or any memories (default any)" }
                    },
                    "required": ["collection"]
                }),
                handler: recall_random,
            },
        ];

        let mut commands = HashMap::new();
        for spec in specs {
            commands.insert(spec.name, spec);
        }
        CommandRegistry { commands }
    }

    /// Get a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Look up and run a command against the service.
    pub fn execute(
        &self,
        service: &MemoryService,
        name: &str,
        params: Value,
    ) -> Result<Value, Error> {
        let spec = self
            .commands
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))?;
        (spec.handler)(service, params)
    }

    /// List all commands with their schemas, ordered by name.
    pub fn list_commands(&self) -> Vec<Value> {
        let mut specs: Vec<&CommandSpec> = self.commands.values().collect();
        specs.sort_by_key(|spec| spec.name);
        specs
            .into_iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": spec.parameters,
                })
            })
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::config::Config;

    use super::*;

    fn offline_service(dir: &TempDir) -> MemoryService {
        let config = Config {
            database_path: dir.path().join("engram.db"),
            embed_url: "http://127.0.0.1:9/v1/embeddings".to_string(),
            embed_model: "test-model".to_string(),
            embed_dims: 4,
            embed_timeout_secs: 2,
        };
        MemoryService::new(&config).unwrap()
    }

    #[test]
    fn test_registry_lists_all_commands_sorted() {
        let registry = CommandRegistry::new();
        let listed = registry.list_commands();

        let names: Vec<&str> = listed
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "list_collections",
                "recall_random",
                "save_memory",
                "search_memory"
            ]
        );
        for command in &listed {
            assert!(command["description"].as_str().is_some());
            assert!(command["parameters"].is_object());
        }
    }

    #[test]
    fn test_unknown_command() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry.execute(&service, "drop_all_memories", json!({}));
        assert!(matches!(result, Err(Error::UnknownCommand(_))));
    }

    #[test]
    fn test_missing_required_param_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry.execute(&service, "save_memory", json!({ "collection": "notes" }));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_negative_top_k_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry.execute(
            &service,
            "search_memory",
            json!({ "collection": "notes", "query": "anything", "top_k": -1 }),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_list_collections_dispatch() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry
            .execute(&service, "list_collections", json!({}))
            .unwrap();
        assert_eq!(result, json!({ "collections": [] }));
    }

    #[test]
    fn test_recall_random_dispatch_with_default_age() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry
            .execute(&service, "recall_random", json!({ "collection": "notes" }))
            .unwrap();
        assert_eq!(result, json!({ "memory": null }));
    }

    #[test]
    fn test_invalid_age_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let service = offline_service(&dir);
        let registry = CommandRegistry::new();

        let result = registry.execute(
            &service,
            "recall_random",
            json!({ "collection": "notes", "age": "yesterday" }),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
