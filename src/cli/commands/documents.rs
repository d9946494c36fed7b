//! Implementation of the `ragline documents` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::DocumentId;

#[derive(Debug, Serialize)]
pub struct DocumentEntry {
    pub id: DocumentId,
    pub chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct DocumentsOutput {
    pub documents: Vec<DocumentEntry>,
}

impl CommandOutput for DocumentsOutput {
    fn to_human(&self) -> String {
        if self.documents.is_empty() {
            return "No documents stored. Run `ragline build` first.".to_string();
        }
        let rows: Vec<(DocumentId, usize)> = self
            .documents
            .iter()
            .map(|d| (d.id.clone(), d.chunks))
            .collect();
        TableFormatter::new().format_documents(&rows)
    }
}

pub async fn execute(ctx: &CliContext, json_mode: bool) -> Result<()> {
    let documents = ctx
        .repository()
        .await?
        .list_documents()
        .await
        .context("Failed to list stored documents")?
        .into_iter()
        .map(|(id, chunks)| DocumentEntry { id, chunks })
        .collect();

    output(&DocumentsOutput { documents }, json_mode);
    Ok(())
}
