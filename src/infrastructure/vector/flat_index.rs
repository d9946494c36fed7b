//! Exact inner-product vector index with atomic file persistence.
//!
//! File layout (little-endian):
//!
//! | field       | type                    |
//! |-------------|-------------------------|
//! | magic       | `b"RIDX"`               |
//! | version     | u16                     |
//! | dimension   | u32                     |
//! | count       | u32                     |
//! | fingerprint | u32 CRC32 of the chunk texts |
//! | model name  | u32 len + UTF-8         |
//! | document id | u32 len + UTF-8         |
//! | vectors     | count × dimension × f32 |
//! | checksum    | u32 CRC32 of everything above |

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{stage, DomainError, DomainResult};

const MAGIC: &[u8; 4] = b"RIDX";
const FORMAT_VERSION: u16 = 2;
const HEADER_LEN: usize = 4 + 2 + 4 + 4 + 4 + 4 + 4;
const CHECKSUM_LEN: usize = 4;

/// Reasons an index file cannot be decoded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexFormatError {
    #[error("bad magic number")]
    BadMagic,

    #[error("file too short ({0} bytes)")]
    TooShort(usize),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("checksum mismatch (stored {stored:08x}, computed {computed:08x})")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("truncated at byte {0}")]
    Truncated(usize),

    #[error("zero dimension")]
    ZeroDimension,

    #[error("{0} is not UTF-8")]
    InvalidUtf8(&'static str),

    #[error("vector payload size overflows")]
    PayloadOverflow,

    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// CRC32 over chunk texts in order, each prefixed by its byte length.
pub fn chunk_fingerprint<'a>(texts: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for text in texts {
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize()
}

/// Flat index over unit vectors; position `i` holds the vector of chunk `i`.
///
/// The index also records the document it was built from and the
/// fingerprint of that document's chunk list.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    model_name: String,
    document_id: String,
    fingerprint: u32,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from vectors in chunk order.
    pub fn build(dimension: usize, vectors: Vec<Vec<f32>>) -> DomainResult<Self> {
        if dimension == 0 {
            return Err(DomainError::invalid_input(
                stage::INDEX,
                "dimension must be greater than 0",
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimension {
                return Err(DomainError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(DomainError::invalid_input(
                    stage::INDEX,
                    format!("vector {position} has non-finite components"),
                ));
            }
            data.extend(vector);
        }

        Ok(Self {
            dimension,
            model_name: String::new(),
            document_id: String::new(),
            fingerprint: 0,
            data,
        })
    }

    /// Record the embedding model that produced the vectors
    #[must_use]
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Record the document and chunk fingerprint the vectors belong to
    #[must_use]
    pub fn with_source(mut self, document_id: impl Into<String>, fingerprint: u32) -> Self {
        self.document_id = document_id.into();
        self.fingerprint = fingerprint;
        self
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub const fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Number of vectors
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Vector at `position`
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Up to `k` `(position, score)` pairs, highest inner product first.
    /// Equal scores keep the lower position first.
    pub fn search(&self, query: &[f32], k: usize) -> DomainResult<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            // `+ 0.0` folds -0.0 into 0.0 so equal scores compare equal
            .map(|(position, vector)| (position, dot(vector, query) + 0.0))
            .collect();

        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize to the on-disk format
    pub fn to_bytes(&self) -> Vec<u8> {
        let name = self.model_name.as_bytes();
        let document = self.document_id.as_bytes();
        let mut buffer = Vec::with_capacity(
            HEADER_LEN + name.len() + document.len() + self.data.len() * 4 + CHECKSUM_LEN,
        );

        buffer.extend_from_slice(MAGIC);
        buffer.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buffer.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        buffer.extend_from_slice(&(self.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&self.fingerprint.to_le_bytes());
        for field in [name, document] {
            buffer.extend_from_slice(&(field.len() as u32).to_le_bytes());
            buffer.extend_from_slice(field);
        }
        for value in &self.data {
            buffer.extend_from_slice(&value.to_le_bytes());
        }

        let checksum = crc32fast::hash(&buffer);
        buffer.extend_from_slice(&checksum.to_le_bytes());
        buffer
    }

    /// Write the index to `path` atomically.
    ///
    /// Equivalent to [`Self::stage`] followed by [`StagedIndex::commit`].
    pub fn persist(&self, path: &Path) -> DomainResult<()> {
        self.stage(path)?.commit()
    }

    /// Write the index to a uniquely named, fsynced sibling of `path`.
    ///
    /// Nothing at `path` changes until the returned [`StagedIndex`] is
    /// committed; dropping it removes the temporary file.
    pub fn stage(&self, path: &Path) -> DomainResult<StagedIndex> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| storage("creating directory for", path, &e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DomainError::Storage(format!("{} has no file name", path.display())))?;

        let staged = StagedIndex {
            temp_path: parent.join(format!(".{file_name}.tmp-{}", Uuid::new_v4())),
            path: path.to_path_buf(),
            parent,
            count: self.len(),
            committed: false,
        };
        write_synced(&staged.temp_path, &self.to_bytes())
            .map_err(|e| storage("writing index", path, &e))?;
        Ok(staged)
    }

    /// Read an index written by [`VectorIndex::persist`]
    pub fn load(path: &Path) -> DomainResult<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(DomainError::IndexNotFound(path.to_path_buf()));
            }
            Err(err) => return Err(storage("reading", path, &err)),
        };

        Self::from_bytes(&bytes).map_err(|err| DomainError::IndexCorrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Parse the on-disk format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexFormatError> {
        if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
            return Err(IndexFormatError::BadMagic);
        }
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(IndexFormatError::TooShort(bytes.len()));
        }

        let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        let mut reader = Reader::new(body);
        reader.take(MAGIC.len())?;

        let version = reader.u16()?;
        if version != FORMAT_VERSION {
            return Err(IndexFormatError::UnsupportedVersion(version));
        }

        let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let computed = crc32fast::hash(body);
        if stored != computed {
            return Err(IndexFormatError::ChecksumMismatch { stored, computed });
        }

        let dimension = reader.u32()? as usize;
        let count = reader.u32()? as usize;
        if dimension == 0 {
            return Err(IndexFormatError::ZeroDimension);
        }
        let fingerprint = reader.u32()?;
        let model_name = reader.string("model name")?;
        let document_id = reader.string("document id")?;

        let payload_len = count
            .checked_mul(dimension)
            .and_then(|values| values.checked_mul(4))
            .ok_or(IndexFormatError::PayloadOverflow)?;
        let payload = reader.take(payload_len)?;
        if !reader.is_empty() {
            return Err(IndexFormatError::TrailingBytes(reader.remaining()));
        }

        let data: Vec<f32> = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self {
            dimension,
            model_name,
            document_id,
            fingerprint,
            data,
        })
    }
}

/// An index written next to its destination, waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedIndex {
    temp_path: PathBuf,
    path: PathBuf,
    parent: PathBuf,
    count: usize,
    committed: bool,
}

impl StagedIndex {
    /// Rename the staged file over the destination.
    ///
    /// Readers see the old file or the new one, never a partial write.
    pub fn commit(mut self) -> DomainResult<()> {
        fs::rename(&self.temp_path, &self.path)
            .map_err(|e| storage("writing index", &self.path, &e))?;
        self.committed = true;

        // Make the rename durable where the platform allows opening directories.
        if let Ok(dir) = File::open(&self.parent) {
            if let Err(err) = dir.sync_all() {
                debug!(error = %err, "directory sync skipped");
            }
        }

        debug!(path = %self.path.display(), count = self.count, "index persisted");
        Ok(())
    }
}

impl Drop for StagedIndex {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = fs::remove_file(&self.temp_path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.temp_path.display(), error = %err, "failed to remove temporary index file");
            }
        }
    }
}

fn storage(action: &str, path: &Path, err: &io::Error) -> DomainError {
    DomainError::Storage(format!("{action} {}: {err}", path.display()))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], IndexFormatError> {
        let end = self
            .cursor
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(IndexFormatError::Truncated(self.cursor))?;
        let slice = &self.bytes[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, IndexFormatError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, IndexFormatError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn string(&mut self, field: &'static str) -> Result<String, IndexFormatError> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| IndexFormatError::InvalidUtf8(field))
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn vectors_strategy() -> impl Strategy<Value = (usize, Vec<Vec<f32>>)> {
        (1usize..8).prop_flat_map(|dim| {
            (
                Just(dim),
                prop::collection::vec(prop::collection::vec(-1.0f32..1.0, dim), 0..30),
            )
        })
    }

    proptest! {
        #[test]
        fn proptest_search_sorted_and_bounded((dim, vectors) in vectors_strategy(), k in 0usize..40) {
            let count = vectors.len();
            let query = vectors.first().cloned().unwrap_or_else(|| vec![0.5; dim]);
            let index = VectorIndex::build(dim, vectors).unwrap();
            let hits = index.search(&query, k).unwrap();

            prop_assert_eq!(hits.len(), k.min(count));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0));
            }
            for (position, _) in &hits {
                prop_assert!(*position < count);
            }
        }

        #[test]
        fn proptest_bytes_round_trip((dim, vectors) in vectors_strategy()) {
            let index = VectorIndex::build(dim, vectors).unwrap().with_model_name("m");
            let decoded = VectorIndex::from_bytes(&index.to_bytes()).unwrap();
            prop_assert_eq!(decoded, index);
        }
    }
}
