//! Recursive character text chunker
//!
//! Splits clean text at the highest-priority separator it contains, merges
//! the pieces greedily into chunks of at most `chunk_size` characters, and
//! carries a tail of at most `chunk_overlap` characters into the next chunk.
//! Pieces that are still too long are split again with the remaining
//! separators, down to single characters.
//!
//! Every chunk is an exact substring of the input, so chunks carry byte
//! offsets and the input can be rebuilt from them.

use std::collections::VecDeque;

use tracing::debug;

use crate::domain::errors::{stage, DomainError, DomainResult};
use crate::domain::models::{Chunk, ChunkingConfig};

/// Byte span of the input with its length in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

impl Span {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: text[start..end].chars().count(),
        }
    }
}

/// Separator-aware text chunker
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker, rejecting invalid size/overlap combinations.
    ///
    /// The character-boundary separator `""` is appended when missing so
    /// no chunk can exceed `chunk_size`.
    pub fn new(mut config: ChunkingConfig) -> DomainResult<Self> {
        config.validate()?;
        if !config.separators.iter().any(String::is_empty) {
            config.separators.push(String::new());
        }
        Ok(Self { config })
    }

    pub const fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split clean text into ordered chunks.
    ///
    /// Empty or whitespace-only text is rejected.
    pub fn split(&self, text: &str) -> DomainResult<Vec<Chunk>> {
        if text.trim().is_empty() {
            return Err(DomainError::invalid_input(
                stage::CHUNK,
                "no text to split",
            ));
        }

        let whole = Span::new(text, 0, text.len());
        let spans = if whole.chars <= self.config.chunk_size {
            vec![whole]
        } else {
            self.split_span(text, whole, &self.config.separators)
        };

        let chunks: Vec<Chunk> = spans
            .into_iter()
            .enumerate()
            .map(|(position, span)| {
                Chunk::new(position, text[span.start..span.end].to_string(), span.start)
            })
            .collect();

        debug!(
            chunk_count = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "text split into chunks"
        );

        Ok(chunks)
    }

    fn split_span(&self, text: &str, span: Span, separators: &[String]) -> Vec<Span> {
        let segment = &text[span.start..span.end];

        // First separator present in the segment wins. The empty separator
        // always matches and ends the recursion.
        let mut separator = separators.last().map_or("", String::as_str);
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if segment.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut out = Vec::new();
        let mut good = Vec::new();
        for piece in split_keep_start(text, span, separator) {
            if piece.chars < self.config.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                out.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                out.push(piece);
            } else {
                out.extend(self.split_span(text, piece, remaining));
            }
        }
        if !good.is_empty() {
            out.extend(self.merge(&good));
        }
        out
    }

    /// Greedily merge contiguous pieces into chunks of at most `chunk_size`
    /// characters, keeping an overlap tail between consecutive chunks.
    fn merge(&self, pieces: &[Span]) -> Vec<Span> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut merged = Vec::new();
        let mut current: VecDeque<Span> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            if total + piece.chars > size {
                if let Some(span) = joined(&current, total) {
                    merged.push(span);
                }
                while total > overlap || (total > 0 && total + piece.chars > size) {
                    match current.pop_front() {
                        Some(front) => total -= front.chars,
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += piece.chars;
        }

        if let Some(span) = joined(&current, total) {
            merged.push(span);
        }
        merged
    }
}

fn joined(current: &VecDeque<Span>, total: usize) -> Option<Span> {
    match (current.front(), current.back()) {
        (Some(first), Some(last)) => Some(Span {
            start: first.start,
            end: last.end,
            chars: total,
        }),
        _ => None,
    }
}

/// Split at every occurrence of `separator`, keeping the separator at the
/// start of the following piece. Empty pieces are dropped. The empty
/// separator splits between characters.
fn split_keep_start(text: &str, span: Span, separator: &str) -> Vec<Span> {
    let segment = &text[span.start..span.end];
    let bounds: Vec<usize> = if separator.is_empty() {
        segment.char_indices().map(|(i, _)| i).skip(1).collect()
    } else {
        segment.match_indices(separator).map(|(i, _)| i).collect()
    };

    let mut pieces = Vec::with_capacity(bounds.len() + 1);
    let mut prev = 0;
    for bound in bounds.into_iter().chain(std::iter::once(segment.len())) {
        if bound > prev {
            pieces.push(Span::new(text, span.start + prev, span.start + bound));
        }
        prev = bound;
    }
    pieces
}
