//! Wiring from loaded configuration to pipeline collaborators.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::adapters::embeddings::provider_from_config;
use crate::adapters::sqlite::{initialize_database, SqliteChunkRepository};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, DocumentId, DocumentSource};
use crate::domain::ports::{ChunkRepository, TextGenerator};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::extract::DocumentExtractor;
use crate::infrastructure::gemini::GeminiGenerator;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::infrastructure::vector::Chunker;
use crate::services::{EmbeddingService, RetrievalPipeline};

/// Loaded configuration plus the logger guard for one CLI invocation.
pub struct CliContext {
    pub config: Config,
    _logger: Option<LoggerImpl>,
}

impl CliContext {
    /// Load configuration and install logging.
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        let log_config =
            LogConfig::try_from(&config.logging).context("Invalid logging configuration")?;
        // A subscriber may already be installed when commands run in-process.
        let logger = match LoggerImpl::init(&log_config) {
            Ok(logger) => Some(logger),
            Err(err) => {
                warn!(error = %err, "logging not initialized");
                None
            }
        };

        debug!(config = ?config, "configuration loaded");
        Ok(Self {
            config,
            _logger: logger,
        })
    }

    /// Context over an explicit configuration, without installing logging
    pub const fn with_config(config: Config) -> Self {
        Self {
            config,
            _logger: None,
        }
    }

    /// Source named in configuration, if any
    pub fn configured_source(&self) -> DomainResult<DocumentSource> {
        DocumentSource::from_options(
            self.config.source.file_path.clone(),
            self.config.source.source_link.clone(),
        )
    }

    /// Document to query: explicit id, else the configured source's id.
    pub fn resolve_document(&self, document: Option<String>) -> Result<DocumentId> {
        match document {
            Some(id) => Ok(DocumentId::new(id)),
            None => Ok(self
                .configured_source()
                .context("No --document given and no source configured")?
                .document_id()),
        }
    }

    pub async fn repository(&self) -> Result<Arc<dyn ChunkRepository>> {
        let pool = initialize_database(&self.config.database)
            .await
            .with_context(|| format!("Failed to open chunk store at {}", self.config.database.path))?;
        Ok(Arc::new(SqliteChunkRepository::new(pool)))
    }

    pub fn generator(&self) -> Result<Arc<dyn TextGenerator>> {
        let generator = GeminiGenerator::new(&self.config.generation)
            .context("Failed to configure the generation service")?;
        Ok(Arc::new(generator))
    }

    /// Pipeline over the configured collaborators, without a generator.
    pub async fn pipeline(&self) -> Result<RetrievalPipeline> {
        let extractor = DocumentExtractor::new(&self.config.extraction)
            .context("Failed to configure the extractor")?;
        let provider = provider_from_config(&self.config.embedding)
            .context("Failed to configure the embedding provider")?;
        let chunker = Chunker::new(self.config.chunking.clone())
            .context("Invalid chunking configuration")?;

        Ok(RetrievalPipeline::new(
            Arc::new(extractor),
            EmbeddingService::new(provider),
            self.repository().await?,
            chunker,
            self.config.index.path.clone(),
        ))
    }
}
