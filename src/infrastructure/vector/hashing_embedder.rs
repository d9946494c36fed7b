//! Deterministic feature-hashing embeddings
//!
//! Lowercased alphanumeric tokens are counted and hashed (djb2) into a
//! fixed number of buckets; the count vector is L2-normalized. Texts that
//! share words get positive similarity, no model download required.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};

/// Offline embedding provider based on term-frequency hashing
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimension: usize,
    model_name: String,
    batch_size: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing vectors of `dimension` components
    pub fn new(dimension: usize) -> DomainResult<Self> {
        if dimension == 0 {
            return Err(DomainError::configuration(
                "embedding dimension must be greater than 0",
            ));
        }
        Ok(Self {
            dimension,
            model_name: format!("hashing-djb2-{dimension}"),
            batch_size: 256,
        })
    }

    /// Override the number of texts per batch call
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *tf.entry(word).or_insert(0) += 1;
        }

        if tf.is_empty() {
            let uniform = 1.0 / (self.dimension as f32).sqrt();
            vector.fill(uniform);
            return vector;
        }

        for (term, count) in &tf {
            let idx = (djb2(term) % self.dimension as u64) as usize;
            vector[idx] += *count as f32;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        for v in &mut vector {
            *v /= norm;
        }
        vector
    }
}

fn djb2(s: &str) -> u64 {
    s.bytes().fold(5381u64, |hash, b| {
        hash.wrapping_mul(33).wrapping_add(u64::from(b))
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> DomainResult<Vec<EmbeddingOutput>> {
        Ok(inputs
            .iter()
            .map(|input| EmbeddingOutput {
                id: input.id.clone(),
                vector: self.embed_text(&input.text),
            })
            .collect())
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }
}
