//! Knowledge base sources.
//!
//! A [`Corpus`] is the ordered list of sources a library is built from. The
//! same sources also yield the [`RawData`] the provenance locator needs.

mod manifest;
mod raw_data;
mod transcript;

pub use manifest::{CorpusManifest, ManifestEntry};
pub use raw_data::{PdfData, RawData, TextData, VideoData};
pub use transcript::{TranscriptFile, TranscriptSegment};

use serde::{Deserialize, Serialize};

/// Kind of content a chunk was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Text,
    Pdf,
    Video,
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(SourceType::Text),
            "pdf" => Ok(SourceType::Pdf),
            "video" => Ok(SourceType::Video),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Text => write!(f, "text"),
            SourceType::Pdf => write!(f, "pdf"),
            SourceType::Video => write!(f, "video"),
        }
    }
}

/// One knowledge base source with the original content it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Plain text document.
    Text { text: String },
    /// PDF, as the text of each page in order.
    Pdf { pages: Vec<String> },
    /// Video, as its timestamped transcript.
    Video { segments: Vec<TranscriptSegment> },
}

impl Source {
    /// Tag of this source.
    pub fn source_type(&self) -> SourceType {
        match self {
            Source::Text { .. } => SourceType::Text,
            Source::Pdf { .. } => SourceType::Pdf,
            Source::Video { .. } => SourceType::Video,
        }
    }

    /// The text that gets chunked and embedded for this source.
    pub fn indexed_text(&self) -> String {
        match self {
            Source::Text { text } => text.clone(),
            Source::Pdf { pages } => pages.concat(),
            Source::Video { segments } => segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Ordered collection of sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub sources: Vec<Source>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source, keeping insertion order.
    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn push(&mut self, source: Source) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }
}
