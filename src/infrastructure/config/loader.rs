use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::EmbeddingProviderKind;

/// Project directory holding configuration, the index and the chunk store
pub const PROJECT_DIR: &str = ".ragline";

/// Environment variable prefix; nested keys use `__`
pub const ENV_PREFIX: &str = "RAGLINE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid chunk_size: {0}. Must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Invalid chunk_overlap: {overlap}. Must be less than chunk_size ({size})")]
    InvalidChunkOverlap { overlap: usize, size: usize },

    #[error("Unknown embedding provider: {0}. Must be one of: hashing, fastembed")]
    UnknownEmbeddingProvider(String),

    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidEmbeddingDimension(usize),

    #[error("Invalid embedding batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Index path cannot be empty")]
    EmptyIndexPath,

    #[error("Invalid top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid temperature: {0}. Must be between 0 and 1")]
    InvalidTemperature(f32),

    #[error("Generation model name cannot be empty")]
    EmptyGenerationModel,

    #[error("Invalid {0} timeout: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .ragline/config.yaml (project config)
    /// 3. .ragline/local.yaml (local overrides, optional)
    /// 4. Environment variables (RAGLINE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(PROJECT_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the project directory at `dir`
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring
    /// environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Chunking
        if config.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(config.chunking.chunk_size));
        }
        if config.chunking.chunk_overlap >= config.chunking.chunk_size {
            return Err(ConfigError::InvalidChunkOverlap {
                overlap: config.chunking.chunk_overlap,
                size: config.chunking.chunk_size,
            });
        }

        // Embedding
        if config
            .embedding
            .provider
            .parse::<EmbeddingProviderKind>()
            .is_err()
        {
            return Err(ConfigError::UnknownEmbeddingProvider(
                config.embedding.provider.clone(),
            ));
        }
        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidEmbeddingDimension(
                config.embedding.dimension,
            ));
        }
        if config.embedding.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.embedding.batch_size));
        }

        if config.index.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyIndexPath);
        }

        if config.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.retrieval.top_k));
        }

        // Generation
        if !(0.0..=1.0).contains(&config.generation.temperature) {
            return Err(ConfigError::InvalidTemperature(
                config.generation.temperature,
            ));
        }
        if config.generation.model_name.trim().is_empty() {
            return Err(ConfigError::EmptyGenerationModel);
        }
        if config.generation.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("generation"));
        }
        if config.extraction.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("extraction"));
        }

        // Database
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::{NamedTempFile, TempDir};

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.index.path, PathBuf::from(".ragline/index/rag.idx"));
        assert_eq!(config.database.path, ".ragline/ragline.db");
        assert_eq!(config.embedding.provider, "hashing");
    }

    #[test]
    fn test_yaml_parsing() {
        let file = yaml_file(
            "source:\n  file_path: docs/manual.pdf\nchunking:\n  chunk_size: 200\n  chunk_overlap: 20\nretrieval:\n  top_k: 5\n",
        );
        let config = temp_env::with_vars_unset(
            ["RAGLINE_CHUNKING__CHUNK_SIZE", "RAGLINE_RETRIEVAL__TOP_K"],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(config.source.file_path, Some(PathBuf::from("docs/manual.pdf")));
        assert_eq!(config.chunking.chunk_size, 200);
        assert_eq!(config.chunking.chunk_overlap, 20);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.generation.model_name, "gemini-1.5-flash");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_file("/nonexistent/ragline.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_chunking() {
        let mut config = Config::default();
        config.chunking.chunk_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidChunkSize(0))
        ));

        let mut config = Config::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidChunkOverlap { .. })
        ));
    }

    #[test]
    fn test_validate_embedding() {
        let mut config = Config::default();
        config.embedding.provider = "word2vec".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::UnknownEmbeddingProvider(_))
        ));

        let mut config = Config::default();
        config.embedding.dimension = 0;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.embedding.batch_size = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_retrieval_and_generation() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTopK(0))
        ));

        let mut config = Config::default();
        config.generation.temperature = 1.2;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature(_))
        ));

        let mut config = Config::default();
        config.generation.model_name = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyGenerationModel)
        ));

        let mut config = Config::default();
        config.extraction.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout("extraction"))
        ));
    }

    #[test]
    fn test_validate_storage() {
        let mut config = Config::default();
        config.index.path = PathBuf::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyIndexPath)
        ));

        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let file = yaml_file("retrieval:\n  top_k: 5\nlogging:\n  level: info\n");
        let config = temp_env::with_vars(
            [
                ("RAGLINE_RETRIEVAL__TOP_K", Some("8")),
                ("RAGLINE_LOGGING__LEVEL", Some("debug")),
                ("RAGLINE_GENERATION__API_CREDENTIAL", Some("key-from-env")),
            ],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(config.retrieval.top_k, 8, "Env should win over file");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.generation.api_credential.as_deref(),
            Some("key-from-env")
        );
    }

    #[test]
    fn test_env_override_fails_validation() {
        let file = yaml_file("retrieval:\n  top_k: 5\n");
        let result = temp_env::with_var("RAGLINE_RETRIEVAL__TOP_K", Some("0"), || {
            ConfigLoader::load_from_file(file.path())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "chunking:\n  chunk_size: 300\nlogging:\n  level: info\n  format: json\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("local.yaml"),
            "chunking:\n  chunk_size: 400\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let config = temp_env::with_vars_unset(
            [
                "RAGLINE_CHUNKING__CHUNK_SIZE",
                "RAGLINE_LOGGING__LEVEL",
                "RAGLINE_LOGGING__FORMAT",
            ],
            || ConfigLoader::load_from_dir(dir.path()),
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 400, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(
            config.chunking.chunk_overlap, 100,
            "Defaults fill unspecified fields"
        );
    }
}
