//! Interactive question session.
//!
//! Every line is answered independently against the library; the looser
//! chat threshold applies unless one is given.

use super::{library_dir, open_library};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Language, Settings};
use crate::library::QueryOptions;
use crate::rag::RunId;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the interactive chat command.
pub async fn run_chat(
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

    let threshold = threshold.unwrap_or(settings.retrieval.chat_threshold);
    let language = language.unwrap_or(settings.completion.language);

    println!("\n{}", style("Aula Chat").bold().cyan());
    println!("{}\n", style("Type your questions, or 'exit' to quit.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let options = QueryOptions::new(threshold)
            .with_top_k(settings.retrieval.top_k)
            .with_language(language)
            .with_run_id(RunId::new());
        debug!("Chat turn {}", options.run_id);

        match library.query(input, &raw_data, &options).await {
            Ok(result) => {
                println!("\n{} {}\n", style("Aula:").cyan().bold(), result.response);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
