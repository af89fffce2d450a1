//! Configuration system for engram.
//!
//! Values are resolved with priority: defaults < config file < env vars.
//! The resolved `Config` is constructed once at startup and handed to each
//! component's constructor; nothing reads process-wide state after that.

use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::Error;

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database.
    pub database_path: PathBuf,

    /// URL of the OpenAI-compatible embeddings endpoint.
    pub embed_url: String,

    /// Model identifier sent with each embedding request.
    pub embed_model: String,

    /// Vector dimension produced by the embedding model. Fixed for the
    /// lifetime of a store; reopening with a different value is rejected.
    pub embed_dims: usize,

    /// Timeout for a single embedding request, in seconds.
    pub embed_timeout_secs: u64,
}

/// Configuration loaded from a TOML file. Missing fields fall back to the
/// built-in defaults during merge.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database_path: PathBuf,

    #[serde(default)]
    pub embed_url: String,

    #[serde(default)]
    pub embed_model: String,

    #[serde(default)]
    pub embed_dims: Option<usize>,

    #[serde(default)]
    pub embed_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        let engram_dir = home.join(".engram");

        Self {
            database_path: engram_dir.join("engram.db"),
            embed_url: "http://localhost:9090/v1/embeddings".to_string(),
            embed_model: "snowflake-arctic-embed-l-v2.0-q4_k_m.gguf".to_string(),
            embed_dims: 1024,
            embed_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(mut file) = load_from_file()? {
            expand_tilde(&mut file.database_path);
            config.merge_from_file(file);
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if !file.database_path.as_os_str().is_empty() {
            self.database_path = file.database_path;
        }
        if !file.embed_url.is_empty() {
            self.embed_url = file.embed_url;
        }
        if !file.embed_model.is_empty() {
            self.embed_model = file.embed_model;
        }
        if let Some(dims) = file.embed_dims {
            self.embed_dims = dims;
        }
        if let Some(timeout) = file.embed_timeout_secs {
            self.embed_timeout_secs = timeout;
        }
    }

    /// Apply `ENGRAM_*` environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), Error> {
        if let Some(value) = env_override("ENGRAM_DATABASE_PATH")? {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = env_override("ENGRAM_EMBED_URL")? {
            self.embed_url = value;
        }
        if let Some(value) = env_override("ENGRAM_EMBED_MODEL")? {
            self.embed_model = value;
        }
        if let Some(value) = env_override("ENGRAM_EMBED_DIMS")? {
            self.embed_dims = value.parse().map_err(|_| {
                Error::Config(format!("ENGRAM_EMBED_DIMS must be a positive integer, got '{value}'"))
            })?;
        }
        if let Some(value) = env_override("ENGRAM_EMBED_TIMEOUT_SECS")? {
            self.embed_timeout_secs = value.parse().map_err(|_| {
                Error::Config(format!(
                    "ENGRAM_EMBED_TIMEOUT_SECS must be a positive integer, got '{value}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Validate configuration values after merging.
    fn validate(&self) -> Result<(), Error> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("database_path must not be empty".to_string()));
        }
        if self.embed_url.trim().is_empty() {
            return Err(Error::Config("embed_url must not be empty".to_string()));
        }
        if !self.embed_url.starts_with("http://") && !self.embed_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "embed_url must be an http(s) URL, got '{}'",
                self.embed_url
            )));
        }
        if self.embed_model.trim().is_empty() {
            return Err(Error::Config("embed_model must not be empty".to_string()));
        }
        if self.embed_dims == 0 {
            return Err(Error::Config("embed_dims must be greater than 0".to_string()));
        }
        if self.embed_timeout_secs == 0 {
            return Err(Error::Config(
                "embed_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Ensure the parent directory for the database path exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

/// Load configuration from the TOML file, if present.
fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));

    let config_path = config_dir.join("engram/config.toml");

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {e}",
                config_path.display()
            ))
        })?;

        let config: ConfigFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {e}",
                config_path.display()
            ))
        })?;

        Ok(Some(config))
    } else {
        Ok(None)
    }
}

/// Read an env var, rejecting empty or whitespace-only values.
fn env_override(name: &str) -> Result<Option<String>, Error> {
    match std::env::var(name) {
        Ok(value) => {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{name} is set but empty")));
            }
            Ok(Some(value))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Config(format!("Failed to read {name}: {e}"))),
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &mut PathBuf) {
    let Some(home) = dirs::home_dir() else { return };
    if let Ok(stripped) = path.strip_prefix("~") {
        let expanded = home.join(stripped);
        *path = expanded;
    }
}
