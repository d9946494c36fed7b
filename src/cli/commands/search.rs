//! Implementation of the `ragline search` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{DocumentId, RetrievalResult};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Question to match against the document
    pub question: String,

    /// Stored document to search (defaults to the configured source)
    #[arg(short, long)]
    pub document: Option<String>,

    /// Number of chunks to return
    #[arg(short = 'k', long = "top-k")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub document: DocumentId,
    pub question: String,
    #[serde(flatten)]
    pub result: RetrievalResult,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.result.is_empty() {
            return format!("No chunks matched in {}.", self.document);
        }
        format!(
            "{}\n\nShowing {} chunk{} from {}",
            TableFormatter::new().format_hits(&self.result),
            self.result.len(),
            if self.result.len() == 1 { "" } else { "s" },
            self.document
        )
    }
}

pub async fn execute(args: SearchArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    let top_k = super::top_k(args.top_k, ctx)?;
    let mut pipeline = ctx.pipeline().await?;
    let document = super::ensure_ready(&mut pipeline, ctx, args.document, json_mode).await?;

    let result = pipeline
        .retrieve(&args.question, top_k)
        .await
        .context("Failed to search the index")?;

    output(
        &SearchOutput {
            document,
            question: args.question,
            result,
        },
        json_mode,
    );
    Ok(())
}
