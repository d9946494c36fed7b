//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::build::BuildArgs;
use super::commands::inspect::InspectArgs;
use super::commands::query::QueryArgs;
use super::commands::search::SearchArgs;

#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(about = "Ragline - question answering over your documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .ragline/config.yaml and .ragline/local.yaml)
    #[arg(short, long, global = true, env = "RAGLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, chunk and embed a document, then persist the index
    Build(BuildArgs),

    /// Answer a question from the indexed document
    Query(QueryArgs),

    /// Show the chunks most similar to a question, without generation
    Search(SearchArgs),

    /// List documents in the chunk store
    Documents,

    /// Show metadata of the persisted index
    Inspect(InspectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_with_file() {
        let cli = Cli::try_parse_from(["ragline", "build", "--file", "notes.pdf"]).unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.file, Some(PathBuf::from("notes.pdf")));
                assert!(args.url.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_sources_conflict() {
        let parsed = Cli::try_parse_from([
            "ragline",
            "build",
            "--file",
            "a.txt",
            "--url",
            "https://example.com",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_query_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ragline",
            "query",
            "what are cats?",
            "-k",
            "5",
            "--json",
            "--config",
            "custom.yaml",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.question, "what are cats?");
                assert_eq!(args.top_k, Some(5));
                assert!(args.document.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_query_requires_question() {
        assert!(Cli::try_parse_from(["ragline", "query"]).is_err());
    }

    #[test]
    fn test_parse_documents() {
        let cli = Cli::try_parse_from(["ragline", "documents"]).unwrap();
        assert!(matches!(cli.command, Commands::Documents));
    }
}
