use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::chunking::ChunkingConfig;
use super::retrieval::DEFAULT_TOP_K;

/// Main configuration structure for ragline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Document to build the corpus from
    #[serde(default)]
    pub source: SourceConfig,

    /// Chunk size and overlap
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index location
    #[serde(default)]
    pub index: IndexConfig,

    /// Retrieval defaults
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generation collaborator configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Chunk store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document source settings. At most one may be set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Local PDF, HTML or text file
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Remote page address
    #[serde(default)]
    pub source_link: Option<String>,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Provider: hashing or fastembed
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Pretrained model name (fastembed provider only)
    #[serde(default = "default_embedding_model")]
    pub model_name: String,

    /// Vector dimension (hashing provider only; pretrained models fix their own)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Texts per provider call
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,

    /// Show model download progress (fastembed provider only)
    #[serde(default)]
    pub show_download_progress: bool,
}

fn default_embedding_provider() -> String {
    "hashing".to_string()
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

const fn default_embedding_dimension() -> usize {
    384
}

const fn default_embedding_batch_size() -> usize {
    32
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model_name: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embedding_batch_size(),
            show_download_progress: false,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexConfig {
    /// Path of the persisted index file
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".ragline/index/rag.idx")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

const fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Generation collaborator configuration.
///
/// The credential is passed in explicitly; nothing reads the process
/// environment behind the caller's back.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Hosted model name
    #[serde(default = "default_generation_model")]
    pub model_name: String,

    /// Sampling temperature in [0, 1]
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// API key for the generation service
    #[serde(default)]
    pub api_credential: Option<String>,

    /// Service base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_generation_model() -> String {
    "gemini-1.5-flash".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

const fn default_generation_timeout_secs() -> u64 {
    60
}

const fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_name: default_generation_model(),
            temperature: default_temperature(),
            api_credential: None,
            base_url: default_generation_base_url(),
            timeout_secs: default_generation_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .field(
                "api_credential",
                &self.api_credential.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".ragline/ragline.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractionConfig {
    /// Timeout for remote fetches in seconds
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for remote fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_extraction_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("ragline/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_extraction_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
