//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;
pub mod types;

pub use context::CliContext;
pub use output::handle_error;
pub use types::{Cli, Commands};

use anyhow::Result;

/// Run one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::init(cli.config.as_deref())?;
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &ctx, cli.json).await,
        Commands::Query(args) => commands::query::execute(args, &ctx, cli.json).await,
        Commands::Search(args) => commands::search::execute(args, &ctx, cli.json).await,
        Commands::Documents => commands::documents::execute(&ctx, cli.json).await,
        Commands::Inspect(args) => commands::inspect::execute(args, &ctx, cli.json).await,
    }
}
