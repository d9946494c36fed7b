//! Embedding domain models
//!
//! Which embedding backend to use and which pretrained model it loads.
//! The corpus and every query must be embedded by the same provider and
//! model, so the model name is persisted alongside the index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Embedding backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// Deterministic feature hashing, offline, no model download
    #[default]
    Hashing,
    /// Pretrained sentence-transformer through ONNX Runtime
    Fastembed,
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hashing => f.write_str("hashing"),
            Self::Fastembed => f.write_str("fastembed"),
        }
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "fastembed" => Ok(Self::Fastembed),
            other => Err(DomainError::configuration(format!(
                "unknown embedding provider '{other}' (expected hashing or fastembed)"
            ))),
        }
    }
}

/// Pretrained sentence embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModel {
    /// all-MiniLM-L6-v2, 384 dimensions
    #[default]
    AllMiniLmL6V2,
    /// BAAI/bge-small-en-v1.5, 384 dimensions
    BgeSmallEnV15,
    /// BAAI/bge-base-en-v1.5, 768 dimensions
    BgeBaseEnV15,
}

impl EmbeddingModel {
    /// Returns the vector dimensions for this model
    pub const fn dimensions(self) -> usize {
        match self {
            Self::AllMiniLmL6V2 | Self::BgeSmallEnV15 => 384,
            Self::BgeBaseEnV15 => 768,
        }
    }

    /// Short model name, as written in configuration and index files
    pub const fn model_name(self) -> &'static str {
        match self {
            Self::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            Self::BgeSmallEnV15 => "bge-small-en-v1.5",
            Self::BgeBaseEnV15 => "bge-base-en-v1.5",
        }
    }

    /// Look a model up by its configured name
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name
            .trim()
            .trim_start_matches("sentence-transformers/")
            .trim_start_matches("BAAI/")
            .to_lowercase();
        match normalized.as_str() {
            "all-minilm-l6-v2" => Some(Self::AllMiniLmL6V2),
            "bge-small-en-v1.5" => Some(Self::BgeSmallEnV15),
            "bge-base-en-v1.5" => Some(Self::BgeBaseEnV15),
            _ => None,
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lookup() {
        assert_eq!(
            EmbeddingModel::from_name("all-MiniLM-L6-v2"),
            Some(EmbeddingModel::AllMiniLmL6V2)
        );
        assert_eq!(
            EmbeddingModel::from_name("sentence-transformers/all-MiniLM-L6-v2"),
            Some(EmbeddingModel::AllMiniLmL6V2)
        );
        assert_eq!(
            EmbeddingModel::from_name("BAAI/bge-base-en-v1.5"),
            Some(EmbeddingModel::BgeBaseEnV15)
        );
        assert_eq!(EmbeddingModel::from_name("unknown"), None);
    }

    #[test]
    fn test_model_dimensions() {
        assert_eq!(EmbeddingModel::AllMiniLmL6V2.dimensions(), 384);
        assert_eq!(EmbeddingModel::BgeBaseEnV15.dimensions(), 768);
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(
            "Hashing".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::Hashing
        );
        assert_eq!(
            "fastembed".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::Fastembed
        );
        assert!("openai".parse::<EmbeddingProviderKind>().is_err());
    }
}
