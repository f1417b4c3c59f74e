//! Build command implementation.

use super::library_dir;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::{CorpusManifest, RawData};
use crate::library::{Components, Library};
use anyhow::Result;
use std::path::Path;

/// Run the build command.
pub async fn run_build(manifest: &Path, output: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Build, None) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let dir = library_dir(output.as_deref(), &settings);
    let base_dir = manifest.parent().unwrap_or_else(|| Path::new("."));

    let corpus = CorpusManifest::load(manifest)?.into_corpus(base_dir)?;
    let raw_data = RawData::from_corpus(&corpus)?;
    Output::info(&format!("Loaded {} sources from {}", corpus.len(), manifest.display()));

    let components = Components::from_settings(&settings)?;

    let spinner = Output::spinner("Chunking and embedding sources...");
    let library = match Library::build(&corpus, components).await {
        Ok(library) => library,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to build library: {}", e));
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    let metadata = library.persist(&dir)?;
    raw_data.save(&Library::raw_data_path(&dir))?;

    Output::success(&format!("Built library in {}", dir.display()));
    Output::kv("Chunks", &library.len().to_string());
    Output::kv("Dimensions", &metadata.dimensions.to_string());
    Output::kv("Embedding model", &metadata.embedding_model);

    Ok(())
}
