use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when calling the Gemini `generateContent` API
#[derive(Error, Debug)]
pub enum GeminiApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - key lacks permission for the model (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown model or endpoint (HTTP 404)
    #[error("Model or endpoint not found")]
    NotFound,

    /// Quota or rate limit exhausted (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from the API (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// No usable candidate text (for example blocked by safety filters)
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl GeminiApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest(body),
            401 => Self::InvalidApiKey,
            403 => Self::Forbidden(body),
            404 => Self::NotFound,
            429 => Self::RateLimitExceeded,
            500..=599 => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    /// Returns true if a later attempt may succeed
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }

    /// Returns true if retrying cannot help
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidApiKey | Self::Forbidden(_) | Self::NotFound
        )
    }
}

impl From<reqwest::Error> for GeminiApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err)
        }
    }
}

impl From<GeminiApiError> for DomainError {
    fn from(err: GeminiApiError) -> Self {
        Self::GenerationUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::BAD_REQUEST, "bad".into()),
            GeminiApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            GeminiApiError::RateLimitExceeded
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            GeminiApiError::ServerError(..)
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            GeminiApiError::UnknownError(..)
        ));
    }

    #[test]
    fn test_error_exclusivity() {
        let rate_limit = GeminiApiError::RateLimitExceeded;
        assert!(rate_limit.is_transient());
        assert!(!rate_limit.is_permanent());

        let invalid = GeminiApiError::InvalidApiKey;
        assert!(!invalid.is_transient());
        assert!(invalid.is_permanent());

        let empty = GeminiApiError::EmptyResponse("SAFETY".into());
        assert!(!empty.is_transient());
        assert!(!empty.is_permanent());
    }

    #[test]
    fn test_into_domain_error() {
        let err: DomainError = GeminiApiError::NotFound.into();
        assert!(matches!(err, DomainError::GenerationUnavailable(_)));
    }
}
