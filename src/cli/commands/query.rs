//! Implementation of the `ragline query` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::DocumentId;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Question to answer
    pub question: String,

    /// Stored document to ask about (defaults to the configured source)
    #[arg(short, long)]
    pub document: Option<String>,

    /// Number of chunks used as context
    #[arg(short = 'k', long = "top-k")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub document: DocumentId,
    pub question: String,
    pub top_k: usize,
    pub answer: String,
}

impl CommandOutput for QueryOutput {
    fn to_human(&self) -> String {
        self.answer.clone()
    }
}

pub async fn execute(args: QueryArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    let top_k = super::top_k(args.top_k, ctx)?;
    let generator = ctx.generator()?;
    let mut pipeline = ctx.pipeline().await?.with_generator(generator);
    let document = super::ensure_ready(&mut pipeline, ctx, args.document, json_mode).await?;

    let spinner = create_spinner("Thinking", json_mode);
    let answer = pipeline.query(&args.question, top_k).await;
    spinner.finish_and_clear();
    let answer = answer.context("Failed to answer the question")?;

    output(
        &QueryOutput {
            document,
            question: args.question,
            top_k,
            answer,
        },
        json_mode,
    );
    Ok(())
}
