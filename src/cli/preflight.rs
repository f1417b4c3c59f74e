//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{AulaError, Result};
use crate::vector_store::SqliteIndexStore;
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Building embeds every chunk.
    Build,
    /// Answering embeds the question and calls the chat model.
    Ask,
    /// Search embeds the query.
    Search,
    /// Info only reads the library files.
    Info,
}

/// Run pre-flight checks for the given operation.
///
/// `library_dir` is the library the operation reads, if any.
pub fn check(operation: Operation, library_dir: Option<&Path>) -> Result<()> {
    match operation {
        Operation::Build => {
            check_api_key()?;
        }
        Operation::Ask | Operation::Search => {
            check_api_key()?;
            if let Some(dir) = library_dir {
                check_library(dir)?;
            }
        }
        Operation::Info => {
            if let Some(dir) = library_dir {
                check_library(dir)?;
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(AulaError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(AulaError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that a library has been built in `dir`.
fn check_library(dir: &Path) -> Result<()> {
    if SqliteIndexStore::new(dir).exists() {
        Ok(())
    } else {
        Err(AulaError::StorageFormat(format!(
            "No library found in {}. Run 'aula build <manifest>' first.",
            dir.display()
        )))
    }
}
