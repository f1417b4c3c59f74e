//! CLI command implementations.

mod ask;
mod build;
mod chat;
mod config;
mod info;
mod search;

pub use ask::run_ask;
pub use build::run_build;
pub use chat::run_chat;
pub use config::run_config;
pub use info::run_info;
pub use search::run_search;

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::RawData;
use crate::library::{Components, Library};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Library directory from `--library`, or the configured default.
fn library_dir(library: Option<&str>, settings: &Settings) -> PathBuf {
    match library {
        Some(dir) => Settings::expand_path(dir),
        None => settings.library_dir(),
    }
}

/// Restore the library in `dir` together with its provenance data.
fn open_library(dir: &Path, settings: &Settings) -> Result<(Library, RawData)> {
    let components = Components::from_settings(settings)?;
    let library = Library::restore(dir, components)
        .with_context(|| format!("Failed to load library from {}", dir.display()))?;

    let raw_path = Library::raw_data_path(dir);
    let raw_data = if raw_path.exists() {
        RawData::load(&raw_path)
            .with_context(|| format!("Failed to read {}", raw_path.display()))?
    } else {
        Output::warning(&format!(
            "{} not found; PDF and video references will be unavailable.",
            raw_path.display()
        ));
        RawData::default()
    };

    Ok((library, raw_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_dir_override() {
        let settings = Settings::default();
        assert_eq!(
            library_dir(Some("/tmp/lesson"), &settings),
            PathBuf::from("/tmp/lesson")
        );
        assert_eq!(library_dir(None, &settings), settings.library_dir());
    }
}
