//! Original source content kept for provenance lookups.
//!
//! Raw data is never indexed. It is only consulted after a chunk has won a
//! query, to find the page or transcript time range it came from.

use super::{Corpus, Source, SourceType};
use crate::error::{AulaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Full text of the plain text source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

/// Full text of the PDF source plus the text of each page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Transcript of the video source as two parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    #[serde(default)]
    pub segment_texts: Vec<String>,
    /// `(start_seconds, end_seconds)` of `segment_texts[i]`.
    #[serde(default)]
    pub segment_times: Vec<(f64, f64)>,
}

/// Per source type original content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<PdfData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoData>,
}

impl RawData {
    /// Collect provenance data from a corpus.
    ///
    /// Provenance is resolved per source type, so a corpus with two sources
    /// of the same type cannot be localized and is rejected.
    pub fn from_corpus(corpus: &Corpus) -> Result<Self> {
        let mut raw = RawData::default();

        for source in corpus.iter() {
            let duplicate = match source {
                Source::Text { text } => raw
                    .text
                    .replace(TextData { text: text.clone() })
                    .is_some(),
                Source::Pdf { pages } => raw
                    .pdf
                    .replace(PdfData {
                        text: pages.concat(),
                        pages: pages.clone(),
                    })
                    .is_some(),
                Source::Video { segments } => raw
                    .video
                    .replace(VideoData {
                        segment_texts: segments.iter().map(|s| s.text.clone()).collect(),
                        segment_times: segments
                            .iter()
                            .map(|s| (s.start_seconds, s.end_seconds))
                            .collect(),
                    })
                    .is_some(),
            };

            if duplicate {
                return Err(AulaError::Config(format!(
                    "Corpus has more than one {} source; provenance needs at most one per type",
                    source.source_type()
                )));
            }
        }

        Ok(raw)
    }

    /// Page texts of the PDF source.
    pub fn pdf_pages(&self) -> Result<&[String]> {
        let pdf = self.pdf.as_ref().ok_or_else(|| missing(SourceType::Pdf))?;
        if pdf.pages.is_empty() {
            return Err(AulaError::DataShape("PDF data has no pages".to_string()));
        }
        Ok(&pdf.pages)
    }

    /// Segment texts and their time ranges for the video source.
    pub fn video_segments(&self) -> Result<(&[String], &[(f64, f64)])> {
        let video = self.video.as_ref().ok_or_else(|| missing(SourceType::Video))?;
        if video.segment_texts.is_empty() {
            return Err(AulaError::DataShape(
                "Video data has no transcript segments".to_string(),
            ));
        }
        if video.segment_texts.len() != video.segment_times.len() {
            return Err(AulaError::DataShape(format!(
                "Video data has {} segment texts but {} segment times",
                video.segment_texts.len(),
                video.segment_times.len()
            )));
        }
        Ok((&video.segment_texts, &video.segment_times))
    }

    /// Write raw data as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved raw data to {:?}", path);
        Ok(())
    }

    /// Read raw data from JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn missing(source_type: SourceType) -> AulaError {
    AulaError::DataShape(format!("No {} data available for provenance", source_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TranscriptSegment;
    use crate::error::ErrorKind;

    fn sample_corpus() -> Corpus {
        Corpus::new()
            .with_source(Source::Text {
                text: "The cat sat on the mat.".to_string(),
            })
            .with_source(Source::Pdf {
                pages: vec!["intro".to_string(), "cats sit on mats".to_string()],
            })
            .with_source(Source::Video {
                segments: vec![
                    TranscriptSegment::new(0.0, 5.0, "hello world".to_string()),
                    TranscriptSegment::new(5.0, 12.0, "goodbye now".to_string()),
                ],
            })
    }

    #[test]
    fn test_from_corpus() {
        let raw = RawData::from_corpus(&sample_corpus()).unwrap();

        assert_eq!(raw.text.as_ref().unwrap().text, "The cat sat on the mat.");
        assert_eq!(raw.pdf_pages().unwrap().len(), 2);
        assert_eq!(raw.pdf.as_ref().unwrap().text, "introcats sit on mats");

        let (texts, times) = raw.video_segments().unwrap();
        assert_eq!(texts, &["hello world".to_string(), "goodbye now".to_string()]);
        assert_eq!(times, &[(0.0, 5.0), (5.0, 12.0)]);
    }

    #[test]
    fn test_duplicate_source_type_rejected() {
        let corpus = Corpus::new()
            .with_source(Source::Text { text: "a".to_string() })
            .with_source(Source::Text { text: "b".to_string() });

        let err = RawData::from_corpus(&corpus).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_malformed_shapes() {
        let raw = RawData::default();
        assert_eq!(raw.pdf_pages().unwrap_err().kind(), ErrorKind::DataShape);
        assert_eq!(raw.video_segments().unwrap_err().kind(), ErrorKind::DataShape);

        let raw: RawData = serde_json::from_str(r#"{"pdf": {"text": "all of it"}}"#).unwrap();
        assert_eq!(raw.pdf_pages().unwrap_err().kind(), ErrorKind::DataShape);

        let raw = RawData {
            video: Some(VideoData {
                segment_texts: vec!["a".to_string(), "b".to_string()],
                segment_times: vec![(0.0, 1.0)],
            }),
            ..Default::default()
        };
        assert_eq!(raw.video_segments().unwrap_err().kind(), ErrorKind::DataShape);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_data.json");

        let raw = RawData::from_corpus(&sample_corpus()).unwrap();
        raw.save(&path).unwrap();

        let loaded = RawData::load(&path).unwrap();
        assert_eq!(loaded, raw);
    }
}
