//! Chunk repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Chunk, DocumentId};

/// Durable storage for the chunk list of each document.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Replace the stored chunks of a document atomically.
    async fn save_chunks(&self, document: &DocumentId, chunks: &[Chunk]) -> DomainResult<()>;

    /// Chunks of a document ordered by position, or `None` if nothing is stored.
    async fn load_chunks(&self, document: &DocumentId) -> DomainResult<Option<Vec<Chunk>>>;

    /// Delete a document's chunks. Returns the number removed.
    async fn delete_chunks(&self, document: &DocumentId) -> DomainResult<u64>;

    /// Stored documents with their chunk counts.
    async fn list_documents(&self) -> DomainResult<Vec<(DocumentId, usize)>>;
}
