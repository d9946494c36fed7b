pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod prompt;
pub mod retrieval;

pub use chunking::{Chunk, ChunkingConfig, DEFAULT_SEPARATORS};
pub use config::{
    Config, DatabaseConfig, EmbeddingConfig, ExtractionConfig, GenerationConfig, IndexConfig,
    LoggingConfig, RetrievalConfig, SourceConfig,
};
pub use document::{DocumentId, DocumentSource};
pub use embedding::{EmbeddingModel, EmbeddingProviderKind};
pub use prompt::{rag_input, PromptTemplate, RAG_PROMPT_TEMPLATE, RAG_SYSTEM_INSTRUCTIONS};
pub use retrieval::{BuildReport, RetrievalResult, ScoredChunk, DEFAULT_TOP_K};
