//! In-memory chunk repository for tests and one-shot runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Chunk, DocumentId};
use crate::domain::ports::ChunkRepository;

/// Chunk store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChunkRepository {
    documents: Arc<RwLock<BTreeMap<DocumentId, Vec<Chunk>>>>,
}

impl InMemoryChunkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn save_chunks(&self, document: &DocumentId, chunks: &[Chunk]) -> DomainResult<()> {
        self.documents
            .write()
            .await
            .insert(document.clone(), chunks.to_vec());
        Ok(())
    }

    async fn load_chunks(&self, document: &DocumentId) -> DomainResult<Option<Vec<Chunk>>> {
        Ok(self.documents.read().await.get(document).cloned())
    }

    async fn delete_chunks(&self, document: &DocumentId) -> DomainResult<u64> {
        let removed = self.documents.write().await.remove(document);
        Ok(removed.map_or(0, |chunks| chunks.len() as u64))
    }

    async fn list_documents(&self) -> DomainResult<Vec<(DocumentId, usize)>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .map(|(id, chunks)| (id.clone(), chunks.len()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_delete() {
        let repo = InMemoryChunkRepository::new();
        let doc = DocumentId::new("file:a.txt");
        let chunks = vec![
            Chunk::new(0, "alpha".to_string(), 0),
            Chunk::new(1, " beta".to_string(), 5),
        ];

        repo.save_chunks(&doc, &chunks).await.unwrap();
        assert_eq!(repo.load_chunks(&doc).await.unwrap(), Some(chunks));
        assert_eq!(repo.list_documents().await.unwrap(), vec![(doc.clone(), 2)]);

        assert_eq!(repo.delete_chunks(&doc).await.unwrap(), 2);
        assert_eq!(repo.load_chunks(&doc).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryChunkRepository::new();
        let other = repo.clone();
        let doc = DocumentId::new("url:https://example.com");

        repo.save_chunks(&doc, &[Chunk::new(0, "x".to_string(), 0)])
            .await
            .unwrap();
        assert!(other.load_chunks(&doc).await.unwrap().is_some());
    }
}
