//! SQLite implementation of the ChunkRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Chunk, DocumentId};
use crate::domain::ports::ChunkRepository;

pub struct SqliteChunkRepository {
    pool: SqlitePool,
}

impl SqliteChunkRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkRepository for SqliteChunkRepository {
    async fn save_chunks(&self, document: &DocumentId, chunks: &[Chunk]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO documents (id, chunk_count, updated_at) VALUES (?, ?, ?)")
            .bind(document.as_str())
            .bind(to_i64(chunks.len())?)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        for chunk in chunks {
            sqlx::query(
                r#"INSERT INTO chunks (document_id, position, content, start_offset, end_offset)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(document.as_str())
            .bind(to_i64(chunk.position)?)
            .bind(&chunk.text)
            .bind(to_i64(chunk.start_offset)?)
            .bind(to_i64(chunk.end_offset)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_chunks(&self, document: &DocumentId) -> DomainResult<Option<Vec<Chunk>>> {
        let known: Option<(i64,)> = sqlx::query_as("SELECT chunk_count FROM documents WHERE id = ?")
            .bind(document.as_str())
            .fetch_optional(&self.pool)
            .await?;
        let Some((expected,)) = known else {
            return Ok(None);
        };

        let rows: Vec<ChunkRow> = sqlx::query_as(
            "SELECT position, content, start_offset, end_offset FROM chunks WHERE document_id = ? ORDER BY position",
        )
        .bind(document.as_str())
        .fetch_all(&self.pool)
        .await?;

        let chunks = rows
            .into_iter()
            .map(Chunk::try_from)
            .collect::<DomainResult<Vec<_>>>()?;

        if to_i64(chunks.len())? != expected {
            return Err(DomainError::Storage(format!(
                "document {document} records {expected} chunks but {} are stored",
                chunks.len()
            )));
        }
        Ok(Some(chunks))
    }

    async fn delete_chunks(&self, document: &DocumentId) -> DomainResult<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn list_documents(&self) -> DomainResult<Vec<(DocumentId, usize)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT id, chunk_count FROM documents ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id, count)| from_i64(count).map(|n| (DocumentId::new(id), n)))
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ChunkRow {
    position: i64,
    content: String,
    start_offset: i64,
    end_offset: i64,
}

impl TryFrom<ChunkRow> for Chunk {
    type Error = DomainError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        let chunk = Self::new(
            from_i64(row.position)?,
            row.content,
            from_i64(row.start_offset)?,
        );
        if to_i64(chunk.end_offset)? != row.end_offset {
            return Err(DomainError::Storage(format!(
                "chunk {} offsets do not match its text",
                chunk.position
            )));
        }
        Ok(chunk)
    }
}

fn to_i64(value: usize) -> DomainResult<i64> {
    i64::try_from(value).map_err(|e| DomainError::Storage(e.to_string()))
}

fn from_i64(value: i64) -> DomainResult<usize> {
    usize::try_from(value).map_err(|e| DomainError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup() -> SqliteChunkRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteChunkRepository::new(pool)
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        let mut offset = 0;
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let chunk = Chunk::new(i, (*t).to_string(), offset);
                offset = chunk.end_offset;
                chunk
            })
            .collect()
    }

    #[tokio::test]
    async fn test_save_and_load_in_order() {
        let repo = setup().await;
        let doc = DocumentId::new("file:notes.txt");
        let stored = chunks(&["first piece", " second", " third"]);

        repo.save_chunks(&doc, &stored).await.unwrap();
        let loaded = repo.load_chunks(&doc).await.unwrap().unwrap();

        assert_eq!(loaded, stored);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_chunks() {
        let repo = setup().await;
        let doc = DocumentId::new("url:https://example.com");

        repo.save_chunks(&doc, &chunks(&["a", "b", "c"])).await.unwrap();
        repo.save_chunks(&doc, &chunks(&["only"])).await.unwrap();

        let loaded = repo.load_chunks(&doc).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "only");
    }

    #[tokio::test]
    async fn test_load_unknown_document() {
        let repo = setup().await;
        let loaded = repo.load_chunks(&DocumentId::new("file:missing")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let repo = setup().await;
        let a = DocumentId::new("file:a.txt");
        let b = DocumentId::new("file:b.txt");
        repo.save_chunks(&a, &chunks(&["x", "y"])).await.unwrap();
        repo.save_chunks(&b, &chunks(&["z"])).await.unwrap();

        let listed = repo.list_documents().await.unwrap();
        assert_eq!(listed, vec![(a.clone(), 2), (b.clone(), 1)]);

        assert_eq!(repo.delete_chunks(&a).await.unwrap(), 2);
        assert!(repo.load_chunks(&a).await.unwrap().is_none());
        assert_eq!(repo.list_documents().await.unwrap(), vec![(b, 1)]);
        assert_eq!(repo.delete_chunks(&a).await.unwrap(), 0);
    }
}
