//! Text generation port.
//!
//! The language model is an opaque collaborator: it receives system
//! instructions and a rendered prompt and returns text.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PromptTemplate;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator name for diagnostics.
    fn name(&self) -> &str;

    /// Render `template` with `values` and generate a reply.
    ///
    /// Template errors fail with a validation error; service failures with
    /// `GenerationUnavailable`.
    async fn generate(
        &self,
        system_instructions: &str,
        template: &PromptTemplate,
        values: &HashMap<String, String>,
    ) -> DomainResult<String>;
}
