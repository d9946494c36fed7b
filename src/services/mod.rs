//! Application services coordinating the domain ports.

pub mod embedding_service;
pub mod rag_pipeline;

pub use embedding_service::EmbeddingService;
pub use rag_pipeline::{ChunkIndex, PipelineState, RetrievalPipeline};
