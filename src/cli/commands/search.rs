//! Search command implementation.

use super::{library_dir, open_library};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    k: Option<usize>,
    library: Option<String>,
    settings: Settings,
) -> Result<()> {
    let dir = library_dir(library.as_deref(), &settings);

    if let Err(e) = preflight::check(Operation::Search, Some(&dir)) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (library, _) = open_library(&dir, &settings)?;
    let k = k.unwrap_or(settings.retrieval.top_k);

    let spinner = Output::spinner("Searching...");
    let results = library.search(query, k).await;
    spinner.finish_and_clear();

    match results {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No results.");
            } else {
                Output::success(&format!("Found {} results", hits.len()));

                for (rank, hit) in hits.iter().enumerate() {
                    Output::search_result(
                        rank + 1,
                        &hit.chunk.source_type.to_string(),
                        hit.chunk.sequence_index,
                        hit.distance,
                        &hit.chunk.text,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
