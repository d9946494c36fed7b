//! HTTP client for the Google Generative Language API.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};

use super::errors::GeminiApiError;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationParameters};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GenerationConfig, PromptTemplate};
use crate::domain::ports::TextGenerator;

/// Text generator backed by a hosted Gemini model.
///
/// One request per call, no retries; failures surface as
/// `GenerationUnavailable` with the classified cause.
pub struct GeminiGenerator {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,

    /// API key sent in the `x-goog-api-key` header
    api_key: String,

    /// Base URL, without trailing slash
    base_url: String,

    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    /// Build a generator from explicit configuration.
    pub fn new(config: &GenerationConfig) -> DomainResult<Self> {
        let api_key = config
            .api_credential
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(
                    "generation.api_credential is required to answer questions",
                )
            })?;

        if !(0.0..=1.0).contains(&config.temperature) {
            return Err(DomainError::configuration(format!(
                "generation.temperature must be within [0, 1], got {}",
                config.temperature
            )));
        }
        if config.model_name.trim().is_empty() {
            return Err(DomainError::configuration(
                "generation.model_name cannot be empty",
            ));
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DomainError::configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn send_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GeminiApiError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(GeminiApiError::from_status(status, body));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed
            .text()
            .ok_or_else(|| GeminiApiError::EmptyResponse(parsed.empty_reason()))
    }
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(
        &self,
        system_instructions: &str,
        template: &PromptTemplate,
        values: &HashMap<String, String>,
    ) -> DomainResult<String> {
        let prompt = template.render(values)?;

        let request = GenerateContentRequest {
            system_instruction: (!system_instructions.is_empty())
                .then(|| Content::system(system_instructions)),
            contents: vec![Content::user(prompt)],
            generation_config: GenerationParameters {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        match self.send_request(&request).await {
            Ok(text) => {
                debug!(chars = text.len(), "generation complete");
                Ok(text)
            }
            Err(err) => {
                warn!(error = %err, transient = err.is_transient(), "generation failed");
                Err(err.into())
            }
        }
    }
}
