//! Retrieval result and build report models.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::chunking::Chunk;
use super::document::DocumentId;

/// Default number of chunks returned per question
pub const DEFAULT_TOP_K: usize = 3;

/// A chunk together with its similarity to the question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Retrieved chunk
    pub chunk: Chunk,
    /// Inner product of unit vectors, in [-1, 1]
    pub score: f32,
}

/// Ranked chunks for one question.
///
/// Ordered by descending score; ties keep the lower chunk position first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RetrievalResult {
    pub chunks: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub const fn len(&self) -> usize {
        self.chunks.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in rank order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.chunk.text.as_str())
    }

    /// Context block handed to the generator: chunk texts joined by newlines,
    /// in rank order.
    pub fn context(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    /// Chunk positions in rank order
    pub fn positions(&self) -> Vec<usize> {
        self.chunks.iter().map(|c| c.chunk.position).collect()
    }
}

/// Summary of a completed build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub document_id: DocumentId,
    pub chunk_count: usize,
    pub dimension: usize,
    pub model_name: String,
    pub index_path: PathBuf,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
