//! Implementation of the `ragline inspect` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::vector::VectorIndex;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Index file (defaults to index.path from configuration)
    #[arg(short, long)]
    pub index: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: PathBuf,
    pub document: String,
    pub model_name: String,
    pub dimension: usize,
    pub vectors: usize,
    pub size_bytes: u64,
}

impl CommandOutput for InspectOutput {
    fn to_human(&self) -> String {
        [
            format!("Index:      {}", self.path.display()),
            format!("Document:   {}", self.document),
            format!("Model:      {}", self.model_name),
            format!("Dimension:  {}", self.dimension),
            format!("Vectors:    {}", self.vectors),
            format!("Size:       {} bytes", self.size_bytes),
        ]
        .join("\n")
    }
}

pub async fn execute(args: InspectArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    let path = args.index.unwrap_or_else(|| ctx.config.index.path.clone());
    let index = VectorIndex::load(&path)?;
    let size_bytes = tokio::fs::metadata(&path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    output(
        &InspectOutput {
            document: index.document_id().to_string(),
            model_name: index.model_name().to_string(),
            dimension: index.dimension(),
            vectors: index.len(),
            size_bytes,
            path,
        },
        json_mode,
    );
    Ok(())
}
