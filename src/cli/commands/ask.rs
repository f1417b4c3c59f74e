//! Ask command implementation.

use super::{library_dir, open_library};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Language, Settings};
use crate::library::QueryOptions;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    threshold: Option<f32>,
    language: Option<Language>,
    library: Option<String>,
    settings: Settings,
) -> Result<()> {
    let dir = library_dir(library.as_deref(), &settings);

    if let Err(e) = preflight::check(Operation::Ask, Some(&dir)) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (library, raw_data) = open_library(&dir, &settings)?;

    let options = QueryOptions::new(threshold.unwrap_or(settings.retrieval.threshold))
        .with_top_k(settings.retrieval.top_k)
        .with_language(language.unwrap_or(settings.completion.language));

    let spinner = Output::spinner("Searching library...");

    match library.query(question, &raw_data, &options).await {
        Ok(result) => {
            spinner.finish_and_clear();
            println!("\n{}\n", result.response);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
