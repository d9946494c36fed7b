//! Common test utilities for integration tests
//!
//! Shared fixtures: fixed-text extractors, a generator that records its
//! prompts, and pipelines wired with the hashing embedder.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use ragline::adapters::memory::InMemoryChunkRepository;
use ragline::domain::models::{ChunkingConfig, DocumentSource, PromptTemplate};
use ragline::domain::ports::{ChunkRepository, ContentExtractor, TextGenerator};
use ragline::infrastructure::vector::{Chunker, HashingEmbeddingProvider};
use ragline::{DomainError, DomainResult, EmbeddingService, RetrievalPipeline};

pub const CATS_AND_DOGS: &str = "Cats are mammals.\n\nDogs are mammals too.";

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Initializes a test-writer subscriber; later calls are no-ops.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Returns the same text for every source.
pub struct StaticExtractor {
    text: String,
}

impl StaticExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ContentExtractor for StaticExtractor {
    async fn extract(&self, _source: &DocumentSource) -> DomainResult<String> {
        Ok(self.text.clone())
    }
}

/// One recorded generation call.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub system: String,
    pub prompt: String,
}

/// Renders the prompt like a real generator, records it and replies with
/// a fixed answer, or fails when configured to.
#[derive(Default)]
pub struct RecordingGenerator {
    calls: Mutex<Vec<GenerationCall>>,
    fail: bool,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(
        &self,
        system_instructions: &str,
        template: &PromptTemplate,
        values: &HashMap<String, String>,
    ) -> DomainResult<String> {
        let prompt = template.render(values)?;
        self.calls.lock().unwrap().push(GenerationCall {
            system: system_instructions.to_string(),
            prompt,
        });
        if self.fail {
            return Err(DomainError::GenerationUnavailable("quota exhausted".into()));
        }
        Ok("generated answer".to_string())
    }
}

/// Pipeline with the 384-dimension hashing embedder.
pub fn hashing_pipeline(
    extractor: Arc<dyn ContentExtractor>,
    repository: Arc<dyn ChunkRepository>,
    chunking: ChunkingConfig,
    index_path: &Path,
) -> RetrievalPipeline {
    RetrievalPipeline::new(
        extractor,
        EmbeddingService::new(Arc::new(HashingEmbeddingProvider::new(384).unwrap())),
        repository,
        Chunker::new(chunking).unwrap(),
        index_path,
    )
}

/// The cats/dogs corpus split into two chunks, in memory.
pub fn cats_and_dogs_pipeline(index_path: &Path) -> RetrievalPipeline {
    hashing_pipeline(
        Arc::new(StaticExtractor::new(CATS_AND_DOGS)),
        Arc::new(InMemoryChunkRepository::new()),
        ChunkingConfig::new(30, 0),
        index_path,
    )
}
