//! CLI module for Aula.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aula - grounded answers over lesson material
///
/// Builds a searchable library from a lesson's text, PDF pages and video
/// transcript, then answers questions and points back to where the answer
/// came from.
#[derive(Parser, Debug)]
#[command(name = "aula")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a library from a corpus manifest
    Build {
        /// TOML manifest listing the text, pdf and video sources
        manifest: PathBuf,

        /// Library directory (defaults to general.library_dir)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Maximum distance a chunk may have to support the answer
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Answer language (english, portuguese)
        #[arg(long)]
        language: Option<Language>,

        /// Library directory
        #[arg(short, long)]
        library: Option<String>,
    },

    /// Start an interactive question session
    Chat {
        /// Maximum distance a chunk may have to support an answer
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Answer language (english, portuguese)
        #[arg(long)]
        language: Option<Language>,

        /// Library directory
        #[arg(short, long)]
        library: Option<String>,
    },

    /// Show the chunks nearest to a query, without answering
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,

        /// Library directory
        #[arg(short, long)]
        library: Option<String>,
    },

    /// Describe a built library
    Info {
        /// Library directory
        #[arg(short, long)]
        library: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "retrieval.threshold")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from([
            "aula",
            "ask",
            "What is a cell?",
            "--threshold",
            "0.25",
            "--language",
            "pt",
        ]);
        match cli.command {
            Commands::Ask {
                question,
                threshold,
                language,
                library,
            } => {
                assert_eq!(question, "What is a cell?");
                assert_eq!(threshold, Some(0.25));
                assert_eq!(language, Some(Language::Portuguese));
                assert!(library.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_and_global_flags() {
        let cli = Cli::parse_from(["aula", "-vv", "search", "cats", "-k", "5"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Search { k: Some(5), .. }));
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::parse_from(["aula", "config", "set", "retrieval.top_k", "4"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Set { .. }
            }
        ));
    }
}
