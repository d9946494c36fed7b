//! Implementation of the `ragline build` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{BuildReport, DocumentSource};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Local PDF, HTML or text file
    #[arg(short, long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Remote page to fetch
    #[arg(short, long)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuildOutput {
    pub success: bool,
    #[serde(flatten)]
    pub report: BuildReport,
}

impl CommandOutput for BuildOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        [
            format!("Built index for {}", report.document_id),
            format!("  Chunks:     {}", report.chunk_count),
            format!("  Dimension:  {}", report.dimension),
            format!("  Model:      {}", report.model_name),
            format!("  Index:      {}", report.index_path.display()),
            format!("  Elapsed:    {:.2?}", report.elapsed),
        ]
        .join("\n")
    }
}

pub async fn execute(args: BuildArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    let source = if args.file.is_some() || args.url.is_some() {
        DocumentSource::from_options(args.file, args.url)?
    } else {
        ctx.configured_source()
            .context("Pass --file or --url, or set source.file_path or source.source_link")?
    };

    let mut pipeline = ctx.pipeline().await?;
    let spinner = create_spinner(format!("Building index for {source}"), json_mode);
    let report = match pipeline.build(&source).await {
        Ok(report) => {
            spinner.finish_success(format!("Indexed {} chunks", report.chunk_count));
            report
        }
        Err(err) => {
            spinner.finish_error("Build failed");
            return Err(err).with_context(|| format!("Failed to build index for {source}"));
        }
    };

    output(
        &BuildOutput {
            success: true,
            report,
        },
        json_mode,
    );
    Ok(())
}
