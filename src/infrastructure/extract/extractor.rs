//! Raw text extraction from local files and remote pages.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument};

use super::html::visible_text;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DocumentSource, ExtractionConfig};
use crate::domain::ports::ContentExtractor;

/// Format of a local file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Html,
    Text,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("html" | "htm" | "xhtml") => Self::Html,
            _ => Self::Text,
        }
    }
}

/// Extractor for PDF, HTML and plain text files and for HTTP(S) pages
pub struct DocumentExtractor {
    client: reqwest::Client,
}

impl DocumentExtractor {
    pub fn new(config: &ExtractionConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DomainError::configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn extract_file(&self, path: &Path) -> DomainResult<String> {
        let unreadable = |reason: String| DomainError::SourceUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".to_string()));
        }

        let kind = FileKind::from_path(path);
        debug!(path = %path.display(), ?kind, bytes = metadata.len(), "reading file");

        match kind {
            FileKind::Pdf => extract_pdf(path.to_path_buf()).await,
            FileKind::Html => {
                let markup = read_utf8(path).await?;
                Ok(visible_text(&markup))
            }
            FileKind::Text => read_utf8(path).await,
        }
    }

    async fn extract_remote(&self, url: &str) -> DomainResult<String> {
        let unavailable = |reason: String| DomainError::RemoteUnavailable {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }

        let is_plain = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/plain"));

        let body = response
            .text()
            .await
            .map_err(|e| unavailable(format!("unreadable body: {e}")))?;

        debug!(url, bytes = body.len(), plain = is_plain, "fetched remote page");

        if is_plain {
            Ok(body)
        } else {
            Ok(visible_text(&body))
        }
    }
}

#[async_trait]
impl ContentExtractor for DocumentExtractor {
    #[instrument(skip(self), fields(source = %source))]
    async fn extract(&self, source: &DocumentSource) -> DomainResult<String> {
        let text = match source {
            DocumentSource::File { path } => self.extract_file(path).await?,
            DocumentSource::Remote { url } => self.extract_remote(url).await?,
        };
        info!(chars = text.chars().count(), "extracted raw text");
        Ok(text)
    }
}

async fn read_utf8(path: &Path) -> DomainResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| DomainError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8: {e}"),
    })
}

/// Page texts concatenated in page order with no separator.
async fn extract_pdf(path: PathBuf) -> DomainResult<String> {
    let pages = parse_pdf_with(path.clone(), |p| {
        pdf_extract::extract_text_by_pages(p).map_err(|e| e.to_string())
    })
    .await?;

    debug!(path = %path.display(), pages = pages.len(), "extracted PDF pages");
    Ok(pages.concat())
}

/// Run a PDF parser on the blocking pool.
///
/// pdf-extract panics on some malformed files; the panic surfaces as a
/// `JoinError` only while the release profile unwinds.
async fn parse_pdf_with<F>(path: PathBuf, parse: F) -> DomainResult<Vec<String>>
where
    F: FnOnce(&Path) -> Result<Vec<String>, String> + Send + 'static,
{
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || parse(&task_path))
        .await
        .map_err(|e| DomainError::SourceUnreadable {
            path: path.clone(),
            reason: format!("PDF parser aborted: {e}"),
        })?
        .map_err(|reason| DomainError::SourceUnreadable {
            path: path.clone(),
            reason: format!("corrupt PDF: {reason}"),
        })
}
