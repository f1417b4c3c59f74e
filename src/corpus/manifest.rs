//! Corpus manifest loading.
//!
//! A manifest lists the local files a library is built from:
//!
//! ```toml
//! [[source]]
//! type = "text"
//! path = "lesson.txt"
//!
//! [[source]]
//! type = "pdf"
//! path = "slides.pages.json"   # JSON array, one string per page
//!
//! [[source]]
//! type = "video"
//! path = "lecture.transcript.json"
//! ```

use super::{Corpus, Source, SourceType, TranscriptFile};
use crate::error::{AulaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Parsed manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusManifest {
    #[serde(rename = "source", default)]
    pub sources: Vec<ManifestEntry>,
}

/// A single `[[source]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub path: PathBuf,
}

impl CorpusManifest {
    /// Parse a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AulaError::Config(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load every listed file into a corpus.
    ///
    /// Relative paths are resolved against `base_dir`.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub fn into_corpus(self, base_dir: &Path) -> Result<Corpus> {
        let mut corpus = Corpus::new();

        for entry in self.sources {
            let path = if entry.path.is_absolute() {
                entry.path.clone()
            } else {
                base_dir.join(&entry.path)
            };

            let source = match entry.source_type {
                SourceType::Text => Source::Text {
                    text: read_source(&path)?,
                },
                SourceType::Pdf => {
                    let pages: Vec<String> =
                        serde_json::from_str(&read_source(&path)?).map_err(|e| {
                            AulaError::Config(format!(
                                "{} is not a JSON array of page texts: {}",
                                path.display(),
                                e
                            ))
                        })?;
                    Source::Pdf { pages }
                }
                SourceType::Video => {
                    let transcript = TranscriptFile::load(&path).map_err(|e| {
                        AulaError::Config(format!(
                            "{} is not a valid transcript: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    Source::Video {
                        segments: transcript.segments,
                    }
                }
            };

            debug!("Loaded {} source from {:?}", entry.source_type, path);
            corpus.push(source);
        }

        Ok(corpus)
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AulaError::Config(format!("Failed to read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_manifest_into_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "The cat sat on the mat.").unwrap();
        std::fs::write(
            dir.path().join("pages.json"),
            r#"["intro", "cats sit on mats"]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("talk.json"),
            r#"{"segments": [{"text": "hello world", "start_seconds": 0, "end_seconds": 5}]}"#,
        )
        .unwrap();

        let manifest_path = dir.path().join("corpus.toml");
        std::fs::write(
            &manifest_path,
            r#"
            [[source]]
            type = "text"
            path = "notes.txt"

            [[source]]
            type = "pdf"
            path = "pages.json"

            [[source]]
            type = "video"
            path = "talk.json"
            "#,
        )
        .unwrap();

        let manifest = CorpusManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.sources.len(), 3);

        let corpus = manifest.into_corpus(dir.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(
            corpus.sources[1],
            Source::Pdf {
                pages: vec!["intro".to_string(), "cats sit on mats".to_string()]
            }
        );
        assert_eq!(corpus.sources[2].indexed_text(), "hello world");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = CorpusManifest {
            sources: vec![ManifestEntry {
                source_type: SourceType::Text,
                path: PathBuf::from("missing.txt"),
            }],
        };

        let err = manifest.into_corpus(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_bad_pages_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pages.json"), r#"{"not": "an array"}"#).unwrap();
        let manifest = CorpusManifest {
            sources: vec![ManifestEntry {
                source_type: SourceType::Pdf,
                path: PathBuf::from("pages.json"),
            }],
        };

        let err = manifest.into_corpus(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
