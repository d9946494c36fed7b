//! Document source and identity models.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Where a document comes from. Exactly one kind of source per build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSource {
    /// A local file (PDF, HTML or plain text)
    File { path: PathBuf },
    /// A remote page fetched over HTTP(S)
    Remote { url: String },
}

impl DocumentSource {
    /// Resolve a source from the two optional settings.
    ///
    /// Exactly one of `file_path` and `source_link` must be set.
    pub fn from_options(
        file_path: Option<PathBuf>,
        source_link: Option<String>,
    ) -> DomainResult<Self> {
        match (file_path, source_link) {
            (None, None) => Err(DomainError::NoSourceConfigured),
            (Some(path), Some(url)) => Err(DomainError::configuration(format!(
                "both a file path ({}) and a remote address ({url}) were given; choose one",
                path.display()
            ))),
            (Some(path), None) => Ok(Self::File { path }),
            (None, Some(url)) => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    return Err(DomainError::NoSourceConfigured);
                }
                Ok(Self::Remote { url })
            }
        }
    }

    /// Local file source
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Remote source
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    /// Stable identity of this source in the chunk store
    pub fn document_id(&self) -> DocumentId {
        match self {
            Self::File { path } => DocumentId(format!("file:{}", path.display())),
            Self::Remote { url } => DocumentId(format!("url:{url}")),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::Remote { url } => f.write_str(url),
        }
    }
}

/// Identity of a document in the chunk store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identity string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&DocumentSource> for DocumentId {
    fn from(source: &DocumentSource) -> Self {
        source.document_id()
    }
}
