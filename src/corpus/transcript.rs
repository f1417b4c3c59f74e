//! Timestamped transcript types.

use crate::error::{AulaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single segment of a transcript with timestamp information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Transcribed text content.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Transcript file as written by the speech-to-text step.
///
/// ```json
/// {"media_id": "lesson-1", "duration_seconds": 12.0,
///  "segments": [{"text": "hello world", "start_seconds": 0.0, "end_seconds": 5.0}]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptFile {
    #[serde(default)]
    pub media_id: String,
    #[serde(default)]
    pub duration_seconds: f64,
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptFile {
    /// Read a transcript from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&content)?;
        file.validate()?;
        Ok(file)
    }

    /// Every segment must end at or after its start.
    pub fn validate(&self) -> Result<()> {
        match self.segments.iter().position(|s| s.duration() < 0.0) {
            Some(i) => Err(AulaError::DataShape(format!(
                "Transcript segment {} ends at {}s before it starts at {}s",
                i, self.segments[i].end_seconds, self.segments[i].start_seconds
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_file() {
        let json = r#"{
            "media_id": "lesson",
            "duration_seconds": 12.0,
            "segments": [
                {"text": "hello world", "start_seconds": 0.0, "end_seconds": 5.0},
                {"text": "goodbye now", "start_seconds": 5.0, "end_seconds": 12.0, "title": "Outro"}
            ]
        }"#;

        let file: TranscriptFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.segments.len(), 2);
        assert_eq!(file.segments[1].text, "goodbye now");
        assert_eq!(file.segments[1].duration(), 7.0);
    }

    #[test]
    fn test_load_rejects_segment_ending_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        std::fs::write(
            &path,
            r#"{"segments": [
                {"text": "hello world", "start_seconds": 0.0, "end_seconds": 5.0},
                {"text": "goodbye now", "start_seconds": 12.0, "end_seconds": 5.0}
            ]}"#,
        )
        .unwrap();

        let err = TranscriptFile::load(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataShape);

        std::fs::write(
            &path,
            r#"{"segments": [{"text": "instant", "start_seconds": 3.0, "end_seconds": 3.0}]}"#,
        )
        .unwrap();
        assert_eq!(TranscriptFile::load(&path).unwrap().segments.len(), 1);
    }

    #[test]
    fn test_segments_only() {
        let file: TranscriptFile =
            serde_json::from_str(r#"{"segments": []}"#).unwrap();
        assert!(file.media_id.is_empty());
        assert!(file.segments.is_empty());
    }
}
