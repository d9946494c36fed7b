//! Pretrained sentence embeddings through fastembed (ONNX Runtime).

use std::sync::Arc;

use async_trait::async_trait;
use ::fastembed::{InitOptions, TextEmbedding};
use tracing::info;

use crate::domain::errors::{stage, DomainError, DomainResult};
use crate::domain::models::EmbeddingModel;
use crate::domain::ports::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};

/// Embedding provider backed by a local fastembed model.
///
/// Inference is CPU-bound and runs on the blocking thread pool.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    kind: EmbeddingModel,
    batch_size: usize,
}

impl FastEmbedProvider {
    /// Load (downloading on first use) the given model.
    pub fn new(
        kind: EmbeddingModel,
        batch_size: usize,
        show_download_progress: bool,
    ) -> DomainResult<Self> {
        let model_name = match kind {
            EmbeddingModel::AllMiniLmL6V2 => ::fastembed::EmbeddingModel::AllMiniLML6V2,
            EmbeddingModel::BgeSmallEnV15 => ::fastembed::EmbeddingModel::BGESmallENV15,
            EmbeddingModel::BgeBaseEnV15 => ::fastembed::EmbeddingModel::BGEBaseENV15,
        };

        let model = TextEmbedding::try_new(InitOptions {
            model_name,
            show_download_progress,
            ..Default::default()
        })
        .map_err(|e| DomainError::configuration(format!("failed to load {kind}: {e}")))?;

        info!(model = %kind, dimension = kind.dimensions(), "loaded embedding model");

        Ok(Self {
            model: Arc::new(model),
            kind,
            batch_size: batch_size.max(1),
        })
    }

    async fn run(&self, texts: Vec<String>) -> DomainResult<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| DomainError::invalid_input(stage::EMBED, format!("embedding task failed: {e}")))?
            .map_err(|e| DomainError::invalid_input(stage::EMBED, e.to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    fn model_name(&self) -> &str {
        self.kind.model_name()
    }

    fn dimension(&self) -> usize {
        self.kind.dimensions()
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        self.run(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::EmptyInput { stage: stage::EMBED })
    }

    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> DomainResult<Vec<EmbeddingOutput>> {
        let texts = inputs.iter().map(|i| i.text.clone()).collect();
        let vectors = self.run(texts).await?;
        if vectors.len() != inputs.len() {
            return Err(DomainError::Consistency {
                chunks: inputs.len(),
                vectors: vectors.len(),
            });
        }
        Ok(inputs
            .iter()
            .zip(vectors)
            .map(|(input, vector)| EmbeddingOutput {
                id: input.id.clone(),
                vector,
            })
            .collect())
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }
}
