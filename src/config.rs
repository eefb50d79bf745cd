//! Configuration module for the brand memory service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `BM_` and use double underscores
//! to separate nested levels:
//! - `BM_EMBEDDING__MODEL=text-embedding-3-large` sets `embedding.model`
//! - `BM_SEARCH__MATCH_COUNT=12` sets `search.match_count`
//! - `BM_SERVER__BIND=0.0.0.0:8787` sets `server.bind`
//!
//! The conventional provider variables `OPENAI_API_KEY`, `SUPABASE_URL` and
//! `SUPABASE_SERVICE_ROLE_KEY` fill in credentials that are still unset after
//! all layers are applied.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::documents::ChunkingConfig;

/// Directory holding the settings file, searched upward from the cwd.
pub const CONFIG_DIR: &str = ".brand-memory";

const ENV_PREFIX: &str = "BM_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Embedding backend settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Persistence backend settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Chunking parameters used at ingestion
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Default search parameters
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Bearer credential for the embedding endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimensionality produced by the model
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which persistence backend to use.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Supabase / PostgREST over HTTP.
    #[default]
    Postgrest,
    /// Process-local store, lost on exit.
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Project URL (e.g. `https://xyz.supabase.co`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Service key sent as `apikey` and bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_documents_table")]
    pub documents_table: String,

    #[serde(default = "default_chunks_table")]
    pub chunks_table: String,

    /// Remote procedure performing the similarity search
    #[serde(default = "default_match_function")]
    pub match_function: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of matches returned
    #[serde(default = "default_match_count")]
    pub match_count: u32,

    /// Minimum similarity score for a match
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Token required on `/v1` routes when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides (e.g. `engine = "debug"`)
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dimensions() -> usize {
    1536
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_documents_table() -> String {
    "brand_documents".to_string()
}
fn default_chunks_table() -> String {
    "brand_chunks".to_string()
}
fn default_match_function() -> String {
    "match_brand_chunks".to_string()
}
fn default_match_count() -> u32 {
    8
}
fn default_similarity_threshold() -> f64 {
    0.70
}
fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            chunking: ChunkingConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            api_key: None,
            documents_table: default_documents_table(),
            chunks_table: default_chunks_table(),
            match_function: default_match_function(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            match_count: default_match_count(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for the config directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref())
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                settings.apply_provider_env(|key| std::env::var(key).ok());
                settings
            })
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path))
            // Double underscore separates nested levels,
            // single underscore remains as is within field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Fill unset credentials from the conventional provider variables.
    fn apply_provider_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.embedding.api_key.is_none() {
            self.embedding.api_key = non_empty("OPENAI_API_KEY");
        }
        if self.store.url.is_none() {
            self.store.url = non_empty("SUPABASE_URL");
        }
        if self.store.api_key.is_none() {
            self.store.api_key = non_empty("SUPABASE_SERVICE_ROLE_KEY");
        }
    }

    /// Check values that would make the engine misbehave.
    ///
    /// Missing credentials are not checked here; they fail when first used.
    pub fn validate(&self) -> Result<(), String> {
        self.chunking.validate()?;

        if self.embedding.dimensions == 0 {
            return Err("embedding.dimensions must be positive".to_string());
        }
        if self.search.match_count == 0 {
            return Err("search.match_count must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.search.similarity_threshold) {
            return Err(format!(
                "search.similarity_threshold ({}) must be within [0, 1]",
                self.search.similarity_threshold
            ));
        }

        Ok(())
    }

    /// Copy of the settings with every credential replaced by a marker.
    pub fn redacted(&self) -> Self {
        const REDACTED: &str = "<redacted>";
        let mut copy = self.clone();
        if copy.embedding.api_key.is_some() {
            copy.embedding.api_key = Some(REDACTED.to_string());
        }
        if copy.store.api_key.is_some() {
            copy.store.api_key = Some(REDACTED.to_string());
        }
        if copy.server.api_token.is_some() {
            copy.server.api_token = Some(REDACTED.to_string());
        }
        copy
    }

    /// Find the settings file by looking for the config directory.
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
