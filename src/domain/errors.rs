//! Domain errors for the ragline retrieval pipeline.
//!
//! Every pipeline stage fails with a variant that names the failing
//! precondition. Variants are grouped into the categories returned by
//! [`DomainError::category`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage names used in validation errors.
pub mod stage {
    /// Raw text normalization.
    pub const PREPROCESS: &str = "preprocess";
    /// Splitting clean text into chunks.
    pub const CHUNK: &str = "chunk";
    /// Mapping text to vectors.
    pub const EMBED: &str = "embed";
    /// Building or searching the vector index.
    pub const INDEX: &str = "index";
    /// Rendering the generation prompt.
    pub const PROMPT: &str = "prompt";
}

/// Broad error classes, used to decide how a caller reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or conflicting options. Fatal, never retried.
    Configuration,
    /// Extraction failure. The whole build may be retried.
    Source,
    /// A stage produced degenerate output.
    Validation,
    /// Index or chunk storage failure. Recoverable by a fresh build.
    Persistence,
    /// Chunk and vector counts disagree. Fatal.
    Consistency,
    /// Operation called before the pipeline holds a corpus.
    Readiness,
    /// The generation collaborator failed.
    Generation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Source => "source",
            Self::Validation => "validation",
            Self::Persistence => "persistence",
            Self::Consistency => "consistency",
            Self::Readiness => "readiness",
            Self::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Domain-level errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No document source configured: supply a file path or a remote address")]
    NoSourceConfigured,

    #[error("Source unreadable: {}: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Remote source unavailable: {url}: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error("Invalid input at {stage} stage: {reason}")]
    InvalidInput { stage: &'static str, reason: String },

    #[error("Empty input at {stage} stage")]
    EmptyInput { stage: &'static str },

    #[error("Index not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Index corrupt: {}: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Chunk/vector count mismatch: {chunks} chunks, {vectors} vectors")]
    Consistency { chunks: usize, vectors: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Pipeline not ready: build or load a corpus first")]
    NotReady,

    #[error("Pipeline could not be restored: {0}")]
    PipelineNotReady(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for an `InvalidInput` error at `stage`.
    pub fn invalid_input(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            stage,
            reason: reason.into(),
        }
    }

    /// Shorthand for a `Configuration` error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// The error class this variant belongs to.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::NoSourceConfigured
            | Self::SourceUnreadable { .. }
            | Self::RemoteUnavailable { .. } => ErrorCategory::Source,
            Self::InvalidInput { .. } | Self::EmptyInput { .. } => ErrorCategory::Validation,
            Self::IndexNotFound(_) | Self::IndexCorrupt { .. } | Self::Storage(_) => {
                ErrorCategory::Persistence
            }
            Self::Consistency { .. } | Self::DimensionMismatch { .. } => {
                ErrorCategory::Consistency
            }
            Self::NotReady | Self::PipelineNotReady(_) => ErrorCategory::Readiness,
            Self::GenerationUnavailable(_) => ErrorCategory::Generation,
        }
    }

    /// True when a caller can recover, either by rebuilding the index
    /// (persistence failures) or by retrying the whole build (source failures
    /// other than a missing source).
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NoSourceConfigured => false,
            _ => matches!(
                self.category(),
                ErrorCategory::Persistence | ErrorCategory::Source
            ),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("serialization: {err}"))
    }
}
