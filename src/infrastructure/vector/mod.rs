//! Vector infrastructure
//!
//! Chunking, deterministic embeddings and the exact flat index.

pub mod chunker;
pub mod flat_index;
pub mod hashing_embedder;

pub use chunker::Chunker;
pub use flat_index::{chunk_fingerprint, IndexFormatError, StagedIndex, VectorIndex};
pub use hashing_embedder::HashingEmbeddingProvider;
