//! Retrieval-augmented generation pipeline.
//!
//! Turns a document source into a searchable chunk index and answers
//! questions against it. The pipeline is either `Unbuilt` or `Ready`; a
//! failed build or load never disturbs the current state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{stage, DomainError, DomainResult};
use crate::domain::models::{
    rag_input, BuildReport, Chunk, DocumentId, DocumentSource, PromptTemplate, RetrievalResult,
    ScoredChunk, RAG_SYSTEM_INSTRUCTIONS,
};
use crate::domain::ports::{ChunkRepository, ContentExtractor, TextGenerator};
use crate::infrastructure::extract::normalize;
use crate::infrastructure::vector::{chunk_fingerprint, Chunker, VectorIndex};
use crate::services::embedding_service::EmbeddingService;

/// Chunks and their vectors, position for position.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    document_id: DocumentId,
    chunks: Vec<Chunk>,
    index: VectorIndex,
}

impl ChunkIndex {
    /// Fuse chunks with their vectors. Counts must agree.
    pub fn new(document_id: DocumentId, chunks: Vec<Chunk>, index: VectorIndex) -> DomainResult<Self> {
        if chunks.len() != index.len() {
            return Err(DomainError::Consistency {
                chunks: chunks.len(),
                vectors: index.len(),
            });
        }
        Ok(Self {
            document_id,
            chunks,
            index,
        })
    }

    pub const fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub const fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, Default)]
pub enum PipelineState {
    /// No corpus yet; only `build` and `load` are allowed.
    #[default]
    Unbuilt,
    /// A corpus is loaded and questions can be answered.
    Ready(ChunkIndex),
}

impl PipelineState {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Build and query pipeline over one document at a time.
pub struct RetrievalPipeline {
    extractor: Arc<dyn ContentExtractor>,
    embedder: EmbeddingService,
    repository: Arc<dyn ChunkRepository>,
    generator: Option<Arc<dyn TextGenerator>>,
    chunker: Chunker,
    index_path: PathBuf,
    prompt: PromptTemplate,
    state: PipelineState,
}

impl RetrievalPipeline {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        embedder: EmbeddingService,
        repository: Arc<dyn ChunkRepository>,
        chunker: Chunker,
        index_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            repository,
            generator: None,
            chunker,
            index_path: index_path.into(),
            prompt: PromptTemplate::rag(),
            state: PipelineState::Unbuilt,
        }
    }

    /// Attach the generator used by [`Self::query`].
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    pub const fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Document currently loaded, if any.
    pub const fn document_id(&self) -> Option<&DocumentId> {
        match &self.state {
            PipelineState::Ready(ready) => Some(ready.document_id()),
            PipelineState::Unbuilt => None,
        }
    }

    pub fn chunk_count(&self) -> usize {
        match &self.state {
            PipelineState::Ready(ready) => ready.len(),
            PipelineState::Unbuilt => 0,
        }
    }

    /// Extract, clean, chunk and embed a document, then store the chunks
    /// and persist the index.
    #[instrument(skip(self), fields(source = %source, index = %self.index_path.display()))]
    pub async fn build(&mut self, source: &DocumentSource) -> DomainResult<BuildReport> {
        let started = Instant::now();
        let document_id = source.document_id();

        let raw = self.extractor.extract(source).await?;
        debug!(bytes = raw.len(), "raw text received");

        let clean = normalize(&raw);
        if clean.is_empty() {
            return Err(DomainError::invalid_input(
                stage::PREPROCESS,
                "document has no text after normalization",
            ));
        }
        debug!(chars = clean.len(), "normalized text");

        let chunks = self.chunker.split(&clean)?;
        info!(chunks = chunks.len(), "split into chunks");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        info!(
            vectors = vectors.len(),
            model = self.embedder.model_name(),
            "embedded chunks"
        );

        let fingerprint = chunk_fingerprint(chunks.iter().map(|c| c.text.as_str()));
        let index = VectorIndex::build(self.embedder.dimension(), vectors)?
            .with_model_name(self.embedder.model_name())
            .with_source(document_id.as_str(), fingerprint);
        let ready = ChunkIndex::new(document_id.clone(), chunks, index)?;

        // The index file is written before the chunk store changes and only
        // renamed into place after it; a failed rename leaves a fingerprint
        // mismatch that `load` rejects.
        let staged = ready.index().stage(&self.index_path)?;
        self.repository
            .save_chunks(&document_id, ready.chunks())
            .await?;
        staged.commit()?;

        let report = BuildReport {
            document_id,
            chunk_count: ready.len(),
            dimension: ready.index().dimension(),
            model_name: ready.index().model_name().to_string(),
            index_path: self.index_path.clone(),
            elapsed: started.elapsed(),
        };
        info!(
            chunks = report.chunk_count,
            elapsed_ms = report.elapsed.as_millis(),
            "index built"
        );

        self.state = PipelineState::Ready(ready);
        Ok(report)
    }

    /// Restore a previously built corpus from the index file and the
    /// chunk store.
    #[instrument(skip(self), fields(index = %self.index_path.display()))]
    pub async fn load(&mut self, document_id: &DocumentId) -> DomainResult<()> {
        let index = VectorIndex::load(&self.index_path)?;

        if index.dimension() != self.embedder.dimension() {
            return Err(DomainError::DimensionMismatch {
                expected: self.embedder.dimension(),
                actual: index.dimension(),
            });
        }
        if index.model_name() != self.embedder.model_name() {
            return Err(DomainError::PipelineNotReady(format!(
                "index was built with model {}, current model is {}; rebuild it",
                index.model_name(),
                self.embedder.model_name()
            )));
        }
        if index.document_id() != document_id.as_str() {
            return Err(DomainError::PipelineNotReady(format!(
                "index holds {}, not {document_id}; rebuild it",
                index.document_id()
            )));
        }

        let chunks = self
            .repository
            .load_chunks(document_id)
            .await?
            .ok_or_else(|| {
                DomainError::PipelineNotReady(format!("no chunks stored for {document_id}"))
            })?;

        let fingerprint = chunk_fingerprint(chunks.iter().map(|c| c.text.as_str()));
        let expected = index.fingerprint();
        let ready = ChunkIndex::new(document_id.clone(), chunks, index)?;
        if fingerprint != expected {
            return Err(DomainError::PipelineNotReady(format!(
                "stored chunks for {document_id} differ from the ones the index was built from; rebuild it"
            )));
        }
        info!(chunks = ready.len(), document = %document_id, "index loaded");
        self.state = PipelineState::Ready(ready);
        Ok(())
    }

    /// The `top_k` chunks most similar to `question`, best first.
    #[instrument(skip(self, question))]
    pub async fn retrieve(&self, question: &str, top_k: usize) -> DomainResult<RetrievalResult> {
        let PipelineState::Ready(ready) = &self.state else {
            return Err(DomainError::NotReady);
        };

        let query = self.embedder.embed_query(question).await?;
        let hits = ready.index().search(&query, top_k)?;

        let mut chunks = Vec::with_capacity(hits.len());
        for (position, score) in hits {
            match ready.chunks().get(position) {
                Some(chunk) => chunks.push(ScoredChunk {
                    chunk: chunk.clone(),
                    score,
                }),
                None => warn!(
                    position,
                    chunk_count = ready.len(),
                    "dropping search hit outside the chunk list"
                ),
            }
        }

        debug!(positions = ?chunks.iter().map(|c| c.chunk.position).collect::<Vec<_>>(), "retrieved");
        Ok(RetrievalResult { chunks })
    }

    /// Answer `question` from the retrieved context.
    #[instrument(skip(self, question))]
    pub async fn query(&self, question: &str, top_k: usize) -> DomainResult<String> {
        let retrieved = self.retrieve(question, top_k).await?;
        let generator = self.generator.as_ref().ok_or_else(|| {
            DomainError::GenerationUnavailable("no text generator configured".to_string())
        })?;

        let values = HashMap::from([(
            "input".to_string(),
            rag_input(&retrieved.context(), question),
        )]);

        let answer = generator
            .generate(RAG_SYSTEM_INSTRUCTIONS, &self.prompt, &values)
            .await?;
        info!(
            generator = generator.name(),
            context_chunks = retrieved.len(),
            "answered question"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChunkRepository;
    use crate::domain::models::ChunkingConfig;
    use crate::infrastructure::vector::HashingEmbeddingProvider;
    use async_trait::async_trait;

    struct StaticExtractor(&'static str);

    #[async_trait]
    impl ContentExtractor for StaticExtractor {
        async fn extract(&self, _source: &DocumentSource) -> DomainResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl ContentExtractor for FailingExtractor {
        async fn extract(&self, source: &DocumentSource) -> DomainResult<String> {
            Err(DomainError::RemoteUnavailable {
                url: source.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn pipeline(extractor: Arc<dyn ContentExtractor>, index_path: &Path) -> RetrievalPipeline {
        RetrievalPipeline::new(
            extractor,
            EmbeddingService::new(Arc::new(HashingEmbeddingProvider::new(384).unwrap())),
            Arc::new(InMemoryChunkRepository::new()),
            Chunker::new(ChunkingConfig::new(30, 0)).unwrap(),
            index_path,
        )
    }

    fn vectors(n: usize) -> VectorIndex {
        let rows = (0..n)
            .map(|i| {
                let mut v = vec![0.0; 4];
                v[i % 4] = 1.0;
                v
            })
            .collect();
        VectorIndex::build(4, rows).unwrap()
    }

    #[test]
    fn test_chunk_index_requires_equal_counts() {
        let chunks = vec![Chunk::new(0, "a".to_string(), 0)];
        let err = ChunkIndex::new(DocumentId::new("file:a"), chunks, vectors(2)).unwrap_err();
        assert!(matches!(err, DomainError::Consistency { chunks: 1, vectors: 2 }));
    }

    #[tokio::test]
    async fn test_build_then_retrieve() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rag.idx");
        let mut pipeline = pipeline(
            Arc::new(StaticExtractor("Cats are mammals.\n\nDogs are mammals too.")),
            &path,
        );

        let report = pipeline
            .build(&DocumentSource::file("animals.txt"))
            .await
            .unwrap();

        assert_eq!(report.chunk_count, 2);
        assert_eq!(report.dimension, 384);
        assert!(path.exists());
        assert!(pipeline.is_ready());
        assert_eq!(pipeline.chunk_count(), 2);

        let result = pipeline.retrieve("What are cats?", 1).await.unwrap();
        assert_eq!(result.positions(), vec![0]);
    }

    #[tokio::test]
    async fn test_blank_document_is_rejected_at_preprocess() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut pipeline = pipeline(
            Arc::new(StaticExtractor("\u{2603} \u{2764}")),
            &dir.path().join("rag.idx"),
        );

        let err = pipeline
            .build(&DocumentSource::file("snow.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { stage: "preprocess", .. }));
        assert!(!pipeline.is_ready());
    }

    #[tokio::test]
    async fn test_failed_build_keeps_state_and_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rag.idx");
        let mut pipeline = pipeline(Arc::new(StaticExtractor("cats purr. dogs bark.")), &path);
        pipeline.build(&DocumentSource::file("a.txt")).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        pipeline.extractor = Arc::new(FailingExtractor);
        let err = pipeline
            .build(&DocumentSource::remote("https://example.com"))
            .await
            .unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(pipeline.document_id(), Some(&DocumentId::new("file:a.txt")));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_query_without_generator() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut pipeline = pipeline(
            Arc::new(StaticExtractor("cats purr.")),
            &dir.path().join("rag.idx"),
        );
        pipeline.build(&DocumentSource::file("a.txt")).await.unwrap();

        let err = pipeline.query("cats?", 3).await.unwrap_err();
        assert!(matches!(err, DomainError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_other_model() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rag.idx");
        let mut built = pipeline(Arc::new(StaticExtractor("cats purr.")), &path);
        built.build(&DocumentSource::file("a.txt")).await.unwrap();

        let mut other = RetrievalPipeline::new(
            Arc::new(StaticExtractor("")),
            EmbeddingService::new(Arc::new(HashingEmbeddingProvider::new(128).unwrap())),
            Arc::new(InMemoryChunkRepository::new()),
            Chunker::new(ChunkingConfig::default()).unwrap(),
            &path,
        );
        let err = other.load(&DocumentId::new("file:a.txt")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::DimensionMismatch { expected: 128, actual: 384 }
        ));
        assert!(!other.is_ready());
    }

    #[tokio::test]
    async fn test_load_without_stored_chunks() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rag.idx");
        let mut built = pipeline(Arc::new(StaticExtractor("cats purr.")), &path);
        built.build(&DocumentSource::file("a.txt")).await.unwrap();

        // fresh repository, same index file
        let mut restored = pipeline(Arc::new(StaticExtractor("")), &path);
        let err = restored
            .load(&DocumentId::new("file:a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PipelineNotReady(_)));
    }
}
