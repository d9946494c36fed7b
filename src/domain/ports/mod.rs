//! Port trait definitions (Hexagonal Architecture)
//!
//! Interfaces the pipeline depends on, implemented by adapters:
//! - ContentExtractor: raw text from a document source
//! - EmbeddingProvider: text to dense vectors
//! - ChunkRepository: durable chunk storage keyed by document
//! - TextGenerator: the language model answering from retrieved context

pub mod chunk_repository;
pub mod content_extractor;
pub mod embedding;
pub mod text_generator;

pub use chunk_repository::ChunkRepository;
pub use content_extractor::ContentExtractor;
pub use embedding::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};
pub use text_generator::TextGenerator;
