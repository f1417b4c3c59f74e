//! Aula CLI entry point.

use anyhow::Result;
use aula::cli::{commands, Cli, Commands};
use aula::config::Settings;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("aula={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Build { manifest, output } => {
            commands::run_build(&manifest, output, settings).await?;
        }

        Commands::Ask {
            question,
            threshold,
            language,
            library,
        } => {
            commands::run_ask(&question, threshold, language, library, settings).await?;
        }

        Commands::Chat {
            threshold,
            language,
            library,
        } => {
            commands::run_chat(threshold, language, library, settings).await?;
        }

        Commands::Search { query, k, library } => {
            commands::run_search(&query, k, library, settings).await?;
        }

        Commands::Info { library } => {
            commands::run_info(library, settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
