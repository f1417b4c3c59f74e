//! Source localization for winning chunks.
//!
//! Once a chunk has answered a query, the locator finds where it came from:
//! a PDF page (or pair of pages when the match is ambiguous) or a time range
//! of the video transcript. Plain text sources need no lookup.

mod tfidf;

pub use tfidf::similarities;

use crate::config::{Language, ProvenanceSettings};
use crate::corpus::{RawData, SourceType};
use crate::error::Result;
use crate::rag::messages;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Where a winning chunk was found. Page indices are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
    TextFile,
    Page { index: usize },
    /// Inclusive range of the two best-scoring pages.
    PageRange { first: usize, last: usize },
    TimeRange { start_seconds: f64, end_seconds: f64 },
}

/// Split seconds into whole minutes and remaining whole seconds.
pub fn minutes_seconds(seconds: f64) -> (u64, u64) {
    let total = seconds.max(0.0) as u64;
    (total / 60, total % 60)
}

/// Render a time range as `m:s-m:s` without zero padding.
pub fn format_time_range(start_seconds: f64, end_seconds: f64) -> String {
    let (start_m, start_s) = minutes_seconds(start_seconds);
    let (end_m, end_s) = minutes_seconds(end_seconds);
    format!("{}:{}-{}:{}", start_m, start_s, end_m, end_s)
}

/// Locates winning chunks inside raw source data.
#[derive(Debug, Clone)]
pub struct Locator {
    ambiguity_margin: f64,
    window_chars: usize,
    one_based_pages: bool,
}

impl Default for Locator {
    fn default() -> Self {
        Self::from_settings(&ProvenanceSettings::default())
    }
}

impl Locator {
    pub fn from_settings(settings: &ProvenanceSettings) -> Self {
        Self {
            ambiguity_margin: settings.ambiguity_margin,
            window_chars: settings.video_window_chars,
            one_based_pages: settings.one_based_pages,
        }
    }

    /// Find the origin of `winning_text`, a chunk of type `source_type`.
    #[instrument(skip(self, winning_text, raw_data))]
    pub fn locate(
        &self,
        winning_text: &str,
        raw_data: &RawData,
        source_type: SourceType,
    ) -> Result<Reference> {
        let reference = match source_type {
            SourceType::Text => Reference::TextFile,
            SourceType::Pdf => self.locate_page(winning_text, raw_data.pdf_pages()?),
            SourceType::Video => {
                let (texts, times) = raw_data.video_segments()?;
                let (start, _end) = self.best_segment_positions(winning_text, texts);
                let (start_seconds, end_seconds) = times[start];
                Reference::TimeRange {
                    start_seconds,
                    end_seconds,
                }
            }
        };

        debug!("Located chunk at {:?}", reference);
        Ok(reference)
    }

    /// Best page, or the two best pages when their scores are within the
    /// ambiguity margin.
    pub fn locate_page(&self, winning_text: &str, pages: &[String]) -> Reference {
        let scores = similarities(winning_text, pages);

        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        // Stable sort keeps lower indices first among equal scores.
        ranked.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));

        match ranked.as_slice() {
            [] => Reference::Page { index: 0 },
            [only] => Reference::Page { index: *only },
            [top, second, ..] => {
                if scores[*top] - scores[*second] <= self.ambiguity_margin {
                    Reference::PageRange {
                        first: (*top).min(*second),
                        last: (*top).max(*second),
                    }
                } else {
                    Reference::Page { index: *top }
                }
            }
        }
    }

    /// Indices of the segments best matching the beginning and the end of
    /// `winning_text`.
    pub fn best_segment_positions(&self, winning_text: &str, segments: &[String]) -> (usize, usize) {
        let char_count = winning_text.chars().count();
        let beginning: String = winning_text.chars().take(self.window_chars).collect();
        let end: String = winning_text
            .chars()
            .skip(char_count.saturating_sub(self.window_chars))
            .collect();

        (
            argmax(&similarities(&beginning, segments)),
            argmax(&similarities(&end, segments)),
        )
    }

    /// Human-readable reference in `language`.
    pub fn render(&self, reference: &Reference, language: Language) -> String {
        let page = |index: usize| {
            if self.one_based_pages {
                index + 1
            } else {
                index
            }
        };

        match reference {
            Reference::TextFile => messages::text_file(language).to_string(),
            Reference::Page { index } => messages::pdf_page(language, page(*index)),
            Reference::PageRange { first, last } => {
                messages::pdf_page_range(language, page(*first), page(*last))
            }
            Reference::TimeRange {
                start_seconds,
                end_seconds,
            } => messages::video_range(language, &format_time_range(*start_seconds, *end_seconds)),
        }
    }
}

/// Index of the first maximum; 0 for empty or all-equal scores.
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Source, TranscriptSegment};
    use crate::error::ErrorKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn raw_data() -> RawData {
        let corpus = Corpus::new()
            .with_source(Source::Text {
                text: "The cat sat on the mat.".to_string(),
            })
            .with_source(Source::Pdf {
                pages: strings(&["intro", "cats sit on mats", "dogs run in parks"]),
            })
            .with_source(Source::Video {
                segments: vec![
                    TranscriptSegment::new(0.0, 5.0, "hello world".to_string()),
                    TranscriptSegment::new(5.0, 12.0, "goodbye now".to_string()),
                ],
            });
        RawData::from_corpus(&corpus).unwrap()
    }

    #[test]
    fn test_text_reference() {
        let locator = Locator::default();
        let reference = locator
            .locate("anything", &raw_data(), SourceType::Text)
            .unwrap();
        assert_eq!(reference, Reference::TextFile);
        assert!(locator
            .render(&reference, Language::English)
            .contains("found in the text file"));
    }

    #[test]
    fn test_single_page() {
        let reference = Locator::default()
            .locate("cats sit on mats", &raw_data(), SourceType::Pdf)
            .unwrap();
        assert_eq!(reference, Reference::Page { index: 1 });
    }

    #[test]
    fn test_ambiguous_pages_become_range() {
        let pages = strings(&[
            "nothing relevant here",
            "photosynthesis converts light energy",
            "misc",
            "photosynthesis converts light energy",
        ]);
        let reference =
            Locator::default().locate_page("photosynthesis converts light energy", &pages);
        assert_eq!(reference, Reference::PageRange { first: 1, last: 3 });
    }

    #[test]
    fn test_margin_is_configurable() {
        let pages = strings(&["cats sit on mats", "cats sit on chairs"]);
        let strict = Locator::from_settings(&ProvenanceSettings {
            ambiguity_margin: 0.0,
            ..Default::default()
        });
        let loose = Locator::from_settings(&ProvenanceSettings {
            ambiguity_margin: 1.0,
            ..Default::default()
        });

        assert_eq!(
            strict.locate_page("cats sit on mats", &pages),
            Reference::Page { index: 0 }
        );
        assert_eq!(
            loose.locate_page("cats sit on mats", &pages),
            Reference::PageRange { first: 0, last: 1 }
        );
    }

    #[test]
    fn test_one_page_always_wins() {
        let reference = Locator::default().locate_page("unrelated", &strings(&["only page"]));
        assert_eq!(reference, Reference::Page { index: 0 });
    }

    #[test]
    fn test_page_location_is_deterministic() {
        let locator = Locator::default();
        let data = raw_data();
        let first = locator.locate("dogs in parks", &data, SourceType::Pdf).unwrap();
        for _ in 0..5 {
            assert_eq!(
                locator.locate("dogs in parks", &data, SourceType::Pdf).unwrap(),
                first
            );
        }
    }

    #[test]
    fn test_video_time_range() {
        let locator = Locator::default();
        let reference = locator
            .locate("goodbye now", &raw_data(), SourceType::Video)
            .unwrap();
        assert_eq!(
            reference,
            Reference::TimeRange {
                start_seconds: 5.0,
                end_seconds: 12.0
            }
        );
        assert!(locator
            .render(&reference, Language::English)
            .ends_with("0:5-0:12"));
    }

    #[test]
    fn test_windows_use_beginning_and_end() {
        let locator = Locator::from_settings(&ProvenanceSettings {
            video_window_chars: 12,
            ..Default::default()
        });
        let segments = strings(&["alpha beta", "gamma delta", "omega sigma"]);
        let positions =
            locator.best_segment_positions("alpha beta then many words omega sigma", &segments);
        assert_eq!(positions, (0, 2));
    }

    #[test]
    fn test_zero_similarity_resolves_to_first() {
        let locator = Locator::default();
        let segments = strings(&["hello world", "goodbye now"]);
        assert_eq!(locator.best_segment_positions("zzz", &segments), (0, 0));

        let pages = strings(&["aaa bbb", "ccc ddd", "eee fff"]);
        assert_eq!(
            locator.locate_page("zzz", &pages),
            Reference::PageRange { first: 0, last: 1 }
        );
    }

    #[test]
    fn test_malformed_raw_data() {
        let locator = Locator::default();
        let err = locator
            .locate("x", &RawData::default(), SourceType::Pdf)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);

        let err = locator
            .locate("x", &RawData::default(), SourceType::Video)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }

    #[test]
    fn test_render_pages() {
        let zero = Locator::default();
        let one = Locator::from_settings(&ProvenanceSettings {
            one_based_pages: true,
            ..Default::default()
        });
        let range = Reference::PageRange { first: 1, last: 2 };

        assert!(zero
            .render(&range, Language::English)
            .contains("between pages 1 and 2"));
        assert!(one
            .render(&range, Language::English)
            .contains("between pages 2 and 3"));
        assert!(one
            .render(&Reference::Page { index: 0 }, Language::Portuguese)
            .contains("página 1"));
    }

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(minutes_seconds(5.0), (0, 5));
        assert_eq!(minutes_seconds(125.9), (2, 5));
        assert_eq!(format_time_range(59.0, 61.0), "0:59-1:1");
    }
}
