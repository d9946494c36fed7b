//! Ragline - retrieval-augmented question answering over documents
//!
//! A document (local PDF, HTML or text file, or a remote page) is extracted,
//! normalized, split into overlapping chunks and embedded into an exact
//! inner-product index. Questions are embedded the same way; the closest
//! chunks become the context handed to a text generator.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and ports
//! - **Adapters** (`adapters`): chunk stores and embedding backends
//! - **Infrastructure Layer** (`infrastructure`): extraction, vectors,
//!   generation client, configuration and logging
//! - **Service Layer** (`services`): embedding service and the retrieval pipeline
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ragline::adapters::memory::InMemoryChunkRepository;
//! use ragline::domain::models::{ChunkingConfig, DocumentSource, ExtractionConfig};
//! use ragline::infrastructure::extract::DocumentExtractor;
//! use ragline::infrastructure::vector::{Chunker, HashingEmbeddingProvider};
//! use ragline::services::{EmbeddingService, RetrievalPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut pipeline = RetrievalPipeline::new(
//!         Arc::new(DocumentExtractor::new(&ExtractionConfig::default())?),
//!         EmbeddingService::new(Arc::new(HashingEmbeddingProvider::new(384)?)),
//!         Arc::new(InMemoryChunkRepository::new()),
//!         Chunker::new(ChunkingConfig::default())?,
//!         ".ragline/index/rag.idx",
//!     );
//!     pipeline.build(&DocumentSource::file("notes.pdf")).await?;
//!     let hits = pipeline.retrieve("what is covered?", 3).await?;
//!     println!("{}", hits.context());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, ErrorCategory};
pub use domain::models::{
    BuildReport, Chunk, ChunkingConfig, Config, DocumentId, DocumentSource, RetrievalResult,
    ScoredChunk,
};
pub use domain::ports::{ChunkRepository, ContentExtractor, EmbeddingProvider, TextGenerator};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ChunkIndex, EmbeddingService, PipelineState, RetrievalPipeline};
