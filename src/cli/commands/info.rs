//! Info command implementation.

use super::library_dir;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::SourceType;
use crate::library::Library;
use crate::vector_store::SqliteIndexStore;
use anyhow::Result;

/// Run the info command.
pub fn run_info(library: Option<String>, settings: Settings) -> Result<()> {
    let dir = library_dir(library.as_deref(), &settings);

    if let Err(e) = preflight::check(Operation::Info, Some(&dir)) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let metadata = SqliteIndexStore::new(&dir).load_metadata()?;

    Output::header(&format!("Library {}", dir.display()));
    Output::kv("Chunks", &metadata.chunks.len().to_string());
    for source_type in [SourceType::Text, SourceType::Pdf, SourceType::Video] {
        let count = metadata
            .chunks
            .iter()
            .filter(|c| c.source_type == source_type)
            .count();
        if count > 0 {
            Output::kv(&format!("  {}", source_type), &count.to_string());
        }
    }
    Output::kv("Dimensions", &metadata.dimensions.to_string());
    Output::kv("Embedding model", &metadata.embedding_model);
    Output::kv("Built at", &metadata.built_at.to_rfc3339());
    Output::kv("Schema version", &metadata.schema_version.to_string());

    let raw_path = Library::raw_data_path(&dir);
    Output::kv(
        "Provenance data",
        if raw_path.exists() { "present" } else { "missing" },
    );

    Ok(())
}
