//! CLI command implementations.

pub mod build;
pub mod documents;
pub mod inspect;
pub mod query;
pub mod search;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::domain::errors::DomainError;
use crate::domain::models::DocumentId;
use crate::services::RetrievalPipeline;

/// Load the document's index, rebuilding it from the configured source when
/// the stored copy is missing or unusable.
pub(crate) async fn ensure_ready(
    pipeline: &mut RetrievalPipeline,
    ctx: &CliContext,
    document: Option<String>,
    json_mode: bool,
) -> Result<DocumentId> {
    let document = ctx.resolve_document(document)?;

    let err = match pipeline.load(&document).await {
        Ok(()) => return Ok(document),
        Err(err) => err,
    };
    let rebuildable = err.is_recoverable() || matches!(err, DomainError::PipelineNotReady(_));
    let source = ctx
        .configured_source()
        .ok()
        .filter(|source| source.document_id() == document);

    match source {
        Some(source) if rebuildable => {
            info!(error = %err, document = %document, "index unavailable, rebuilding");
            let spinner = create_spinner(format!("Building index for {source}"), json_mode);
            match pipeline.build(&source).await {
                Ok(report) => {
                    spinner.finish_success(format!("Indexed {} chunks", report.chunk_count));
                    Ok(document)
                }
                Err(build_err) => {
                    spinner.finish_error("Build failed");
                    Err(build_err).with_context(|| format!("Failed to build index for {source}"))
                }
            }
        }
        _ => Err(err).with_context(|| {
            format!("No usable index for {document}; run `ragline build` first")
        }),
    }
}

pub(crate) fn top_k(requested: Option<usize>, ctx: &CliContext) -> Result<usize> {
    let top_k = requested.unwrap_or(ctx.config.retrieval.top_k);
    if top_k == 0 {
        anyhow::bail!("top-k must be at least 1");
    }
    Ok(top_k)
}
