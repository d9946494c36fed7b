//! Embedding provider adapters.

#[cfg(feature = "semantic-search")]
pub mod fastembed;

#[cfg(feature = "semantic-search")]
pub use self::fastembed::FastEmbedProvider;

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind};
use crate::domain::ports::EmbeddingProvider;
use crate::infrastructure::vector::HashingEmbeddingProvider;

/// Build the provider named by `embedding.provider`.
pub fn provider_from_config(config: &EmbeddingConfig) -> DomainResult<Arc<dyn EmbeddingProvider>> {
    let kind: EmbeddingProviderKind = config.provider.parse()?;
    match kind {
        EmbeddingProviderKind::Hashing => Ok(Arc::new(
            HashingEmbeddingProvider::new(config.dimension)?.with_batch_size(config.batch_size),
        )),
        EmbeddingProviderKind::Fastembed => fastembed_provider(config),
    }
}

#[cfg(feature = "semantic-search")]
fn fastembed_provider(config: &EmbeddingConfig) -> DomainResult<Arc<dyn EmbeddingProvider>> {
    use crate::domain::models::EmbeddingModel;

    let model = EmbeddingModel::from_name(&config.model_name).ok_or_else(|| {
        DomainError::configuration(format!(
            "unknown embedding model: {}",
            config.model_name
        ))
    })?;
    Ok(Arc::new(FastEmbedProvider::new(
        model,
        config.batch_size,
        config.show_download_progress,
    )?))
}

#[cfg(not(feature = "semantic-search"))]
fn fastembed_provider(_config: &EmbeddingConfig) -> DomainResult<Arc<dyn EmbeddingProvider>> {
    Err(DomainError::configuration(
        "embedding provider 'fastembed' requires building with the semantic-search feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_provider_from_config() {
        let config = EmbeddingConfig {
            dimension: 64,
            ..EmbeddingConfig::default()
        };
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "hashing");
        assert_eq!(provider.dimension(), 64);
        assert_eq!(provider.max_batch_size(), config.batch_size);
    }

    #[test]
    fn test_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "word2vec".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            provider_from_config(&config),
            Err(DomainError::Configuration(_))
        ));
    }

    #[cfg(not(feature = "semantic-search"))]
    #[test]
    fn test_fastembed_needs_feature() {
        let config = EmbeddingConfig {
            provider: "fastembed".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = provider_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("semantic-search"));
    }
}
