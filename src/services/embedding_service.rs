//! Embedding service for corpus and query vectors.
//!
//! Wraps one embedding provider so that the corpus and every query go
//! through the same model and the same normalization. Large inputs are
//! split into provider-sized batches; output order always matches input
//! order.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::{stage, DomainError, DomainResult};
use crate::domain::ports::embedding::{EmbeddingInput, EmbeddingProvider};

/// Embedding service that orchestrates embedding generation.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Provider name for diagnostics.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Model identity recorded in the index.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Embed texts in order, returning one unit vector per text.
    pub async fn embed(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(DomainError::EmptyInput { stage: stage::EMBED });
        }

        let inputs: Vec<EmbeddingInput> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| EmbeddingInput {
                id: i.to_string(),
                text: text.clone(),
            })
            .collect();

        let batch_size = self.provider.max_batch_size().max(1);
        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_no, batch) in inputs.chunks(batch_size).enumerate() {
            let outputs = self.provider.embed_batch(batch).await?;
            if outputs.len() != batch.len() {
                return Err(DomainError::Consistency {
                    chunks: batch.len(),
                    vectors: outputs.len(),
                });
            }
            for (input, output) in batch.iter().zip(outputs) {
                if output.id != input.id {
                    return Err(DomainError::invalid_input(
                        stage::EMBED,
                        format!("provider returned id {} for input {}", output.id, input.id),
                    ));
                }
                vectors.push(self.finish(output.vector)?);
            }
            debug!(batch = batch_no, size = batch.len(), "embedded batch");
        }

        Ok(vectors)
    }

    /// Embed a single question with the corpus provider.
    pub async fn embed_query(&self, text: &str) -> DomainResult<Vec<f32>> {
        let vector = self.provider.embed(text).await?;
        self.finish(vector)
    }

    fn finish(&self, vector: Vec<f32>) -> DomainResult<Vec<f32>> {
        let expected = self.provider.dimension();
        if vector.len() != expected {
            return Err(DomainError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        normalize(vector)
    }
}

/// Scale a vector to unit L2 norm.
///
/// Zero and non-finite vectors have no direction and are rejected.
pub fn normalize(mut vector: Vec<f32>) -> DomainResult<Vec<f32>> {
    let norm = vector
        .iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return Err(DomainError::invalid_input(
            stage::EMBED,
            "embedding has no direction (zero or non-finite norm)",
        ));
    }
    let norm = norm as f32;
    for v in &mut vector {
        *v /= norm;
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::EmbeddingOutput;
    use crate::infrastructure::vector::HashingEmbeddingProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns unnormalized vectors and counts batch calls.
    struct ScaledProvider {
        dimension: usize,
        batch_calls: AtomicUsize,
        emit_dimension: usize,
    }

    impl ScaledProvider {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                batch_calls: AtomicUsize::new(0),
                emit_dimension: dimension,
            }
        }

        fn vector(&self, text: &str) -> Vec<f32> {
            let mut v = vec![0.0; self.emit_dimension];
            v[0] = 3.0;
            if self.emit_dimension > 1 {
                v[1] = text.len() as f32;
            }
            v
        }
    }

    #[async_trait]
    impl EmbeddingProvider for ScaledProvider {
        fn name(&self) -> &'static str {
            "scaled"
        }

        fn model_name(&self) -> &str {
            "scaled-test"
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
            Ok(self.vector(text))
        }

        async fn embed_batch(
            &self,
            inputs: &[EmbeddingInput],
        ) -> DomainResult<Vec<EmbeddingOutput>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(inputs
                .iter()
                .map(|i| EmbeddingOutput {
                    id: i.id.clone(),
                    vector: self.vector(&i.text),
                })
                .collect())
        }

        fn max_batch_size(&self) -> usize {
            2
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let service = EmbeddingService::new(Arc::new(ScaledProvider::new(4)));
        let err = service.embed(&[]).await.unwrap_err();
        assert!(matches!(err, DomainError::EmptyInput { stage: "embed" }));
    }

    #[tokio::test]
    async fn test_batches_and_normalizes() {
        let provider = Arc::new(ScaledProvider::new(4));
        let service = EmbeddingService::new(provider.clone());

        let vectors = service
            .embed(&texts(&["abcd", "", "abcdefghijkl", "x", "yy"]))
            .await
            .unwrap();

        assert_eq!(vectors.len(), 5);
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 3);
        // [3, 4, 0, 0] / 5
        assert!((vectors[0][0] - 0.6).abs() < 1e-6);
        assert!((vectors[0][1] - 0.8).abs() < 1e-6);
        // [3, 0, 0, 0] / 3
        assert!((vectors[1][0] - 1.0).abs() < 1e-6);
        for v in &vectors {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_detected() {
        let mut provider = ScaledProvider::new(4);
        provider.emit_dimension = 3;
        let service = EmbeddingService::new(Arc::new(provider));

        let err = service.embed(&texts(&["a"])).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::DimensionMismatch { expected: 4, actual: 3 }
        ));
        assert!(service.embed_query("a").await.is_err());
    }

    #[tokio::test]
    async fn test_query_matches_corpus_embedding() {
        let service =
            EmbeddingService::new(Arc::new(HashingEmbeddingProvider::new(64).unwrap()));
        let corpus = service.embed(&texts(&["cats are mammals"])).await.unwrap();
        let query = service.embed_query("cats are mammals").await.unwrap();
        assert_eq!(corpus[0], query);
        assert_eq!(service.provider_name(), "hashing");
        assert_eq!(service.dimension(), 64);
    }

    #[test]
    fn test_normalize_rejects_zero_vector() {
        assert!(normalize(vec![0.0, 0.0]).is_err());
        assert!(normalize(vec![f32::NAN, 1.0]).is_err());
    }
}
