//! Content extraction port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::DocumentSource;

/// Produces raw text from a document source, preserving reading order.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, source: &DocumentSource) -> DomainResult<String>;
}
