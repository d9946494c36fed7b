//! Text chunking domain models
//!
//! Models for splitting clean document text into ordered, overlapping
//! fragments suitable for embedding.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Separators tried in priority order: paragraph break, line break, sentence
/// terminators, comma, space, then the raw character boundary.
pub const DEFAULT_SEPARATORS: [&str; 8] = ["\n\n", "\n", ".", "!", "?", ",", " ", ""];

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum size of each chunk in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters repeated between consecutive chunks (upper bound)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Separators tried in order when looking for natural split points.
    /// An empty string splits between characters.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

const fn default_chunk_size() -> usize {
    500
}

const fn default_chunk_overlap() -> usize {
    100
}

fn default_separators() -> Vec<String> {
    DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
        }
    }
}

impl ChunkingConfig {
    /// Configuration with the default separators and the given bounds.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        }
    }

    /// Validate the chunking configuration
    pub fn validate(&self) -> DomainResult<()> {
        if self.chunk_size == 0 {
            return Err(DomainError::configuration(
                "chunk_size must be greater than 0",
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

/// A fragment of clean document text.
///
/// `text` is always `clean[start_offset..end_offset]` (byte offsets) of the
/// text it was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position within the document, 0-based, in document order
    pub position: usize,

    /// The chunk text
    pub text: String,

    /// Byte offset of the first character in the clean text
    pub start_offset: usize,

    /// Byte offset one past the last character in the clean text
    pub end_offset: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(position: usize, text: String, start_offset: usize) -> Self {
        let end_offset = start_offset + text.len();
        Self {
            position,
            text,
            start_offset,
            end_offset,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if this is the first chunk
    pub const fn is_first(&self) -> bool {
        self.position == 0
    }

    /// Get a preview of the content (first `max_chars` characters)
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let head: String = self.text.chars().take(max_chars).collect();
            format!("{head}...")
        }
    }
}
