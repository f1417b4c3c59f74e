//! Recursive token-bounded text splitting.
//!
//! Text is cut on the coarsest separator it contains (paragraphs, then lines,
//! then words, then characters). Pieces under the budget are merged greedily;
//! pieces at or over the budget are cut again with the next finer separator.

use super::TokenCounter;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;

/// Separators tried in order, coarsest first. The empty separator splits
/// into characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into overlapping pieces of at most `chunk_size` tokens.
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    counter: Arc<dyn TokenCounter>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            counter,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Token count of `text` under this splitter's counter.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Split `text` into trimmed, non-empty pieces.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut small: Vec<(String, usize)> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            let tokens = self.counter.count(&piece);
            if tokens < self.chunk_size {
                small.push((piece, tokens));
                continue;
            }

            if !small.is_empty() {
                final_chunks.extend(self.merge_splits(&small));
                small.clear();
            }

            if finer.is_empty() {
                final_chunks.push(piece);
            } else {
                final_chunks.extend(self.split_recursive(&piece, finer));
            }
        }

        if !small.is_empty() {
            final_chunks.extend(self.merge_splits(&small));
        }

        final_chunks
    }

    /// Greedily pack pieces into chunks, carrying the tail of each chunk
    /// (at most `chunk_overlap` tokens) into the next one.
    ///
    /// Chunks are emitted trimmed, and BPE can encode a trimmed word with
    /// more tokens than the same word after a space. The budget is therefore
    /// checked against the trimmed text a chunk would actually contain, not
    /// against the sum of the piece counts.
    fn merge_splits(&self, pieces: &[(String, usize)]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for (piece, tokens) in pieces {
            if !current.is_empty() && !self.fits(&current, piece) {
                if let Some(doc) = self.emit(&current) {
                    docs.push(doc);
                }

                while total > self.chunk_overlap || (total > 0 && !self.fits(&current, piece)) {
                    match current.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            current.push_back((piece.as_str(), *tokens));
            total += tokens;
        }

        if let Some(doc) = self.emit(&current) {
            docs.push(doc);
        }

        docs
    }

    /// Whether `current` followed by `next` stays within the budget once trimmed.
    fn fits(&self, current: &VecDeque<(&str, usize)>, next: &str) -> bool {
        let mut joined: String = current.iter().map(|(p, _)| *p).collect();
        joined.push_str(next);
        self.counter.count(joined.trim()) <= self.chunk_size
    }

    fn emit(&self, pieces: &VecDeque<(&str, usize)>) -> Option<String> {
        let doc = join_pieces(pieces)?;
        let tokens = self.counter.count(&doc);
        if tokens > self.chunk_size {
            warn!(
                "Created a chunk of {} tokens, longer than the budget of {}",
                tokens, self.chunk_size
            );
        }
        Some(doc)
    }
}

/// Split on `separator`, prefixing every piece after the first with it.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut parts = text.split(separator);
    let mut pieces = Vec::new();
    if let Some(first) = parts.next() {
        if !first.is_empty() {
            pieces.push(first.to_string());
        }
    }
    for part in parts {
        pieces.push(format!("{}{}", separator, part));
    }
    pieces
}

fn join_pieces(pieces: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = pieces.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TiktokenCounter;
    use crate::config::TokenEncoding;

    /// Counts whitespace separated words.
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    fn words(range: std::ops::Range<usize>) -> String {
        range.map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\n\n\nb", "\n\n"),
            vec!["a", "\n\n", "\n\nb"]
        );
        assert_eq!(split_keeping_separator(" a b", " "), vec![" a", " b"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }

    #[test]
    fn test_small_text_single_chunk() {
        let splitter = RecursiveSplitter::new(500, 20, Arc::new(WordCounter));
        let chunks = splitter.split_text("The cat sat on the mat.");
        assert_eq!(chunks, vec!["The cat sat on the mat."]);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        let splitter = RecursiveSplitter::new(500, 20, Arc::new(WordCounter));
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn test_word_overlap() {
        let splitter = RecursiveSplitter::new(10, 3, Arc::new(WordCounter));
        let chunks = splitter.split_text(&words(0..30));

        assert_eq!(
            chunks,
            vec![words(0..10), words(7..17), words(14..24), words(21..30)]
        );
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::new(8, 0, Arc::new(WordCounter));
        let text = "one two three four\n\nfive six seven\n\neight nine ten eleven";
        let chunks = splitter.split_text(text);

        assert_eq!(
            chunks,
            vec![
                "one two three four\n\nfive six seven",
                "eight nine ten eleven",
            ]
        );
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_words() {
        let splitter = RecursiveSplitter::new(5, 0, Arc::new(WordCounter));
        let text = format!("short one\n\n{}", words(0..12));
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks[0], "short one");
        for chunk in &chunks {
            assert!(WordCounter.count(chunk) <= 5, "chunk too long: {:?}", chunk);
        }
        let rejoined = chunks[1..].join(" ");
        assert_eq!(rejoined, words(0..12));
    }

    #[test]
    fn test_trimmed_chunks_respect_budget_on_portuguese_text() {
        let counter = Arc::new(TiktokenCounter::new(TokenEncoding::P50kBase).unwrap());
        let text = "A fotossíntese é o processo pelo qual as plantas convertem energia \
                    luminosa em energia química. As folhas absorvem a luz do sol e \
                    produzem glicose a partir de água e dióxido de carbono. "
            .repeat(6);

        for (budget, overlap) in [(7, 3), (13, 3), (25, 5), (50, 10)] {
            let splitter = RecursiveSplitter::new(budget, overlap, counter.clone());
            let chunks = splitter.split_text(&text);
            assert!(chunks.len() > 1);
            for chunk in &chunks {
                assert_eq!(chunk, chunk.trim());
                assert!(
                    counter.count(chunk) <= budget,
                    "budget {}: {:?} has {} tokens",
                    budget,
                    chunk,
                    counter.count(chunk)
                );
            }
        }
    }

    #[test]
    fn test_respects_token_budget() {
        let counter = Arc::new(TiktokenCounter::new(TokenEncoding::P50kBase).unwrap());
        let splitter = RecursiveSplitter::new(50, 10, counter.clone());

        let text = (0..40)
            .map(|i| {
                format!(
                    "Paragraph {} explains how the lesson on topic {} connects to the rest.",
                    i, i
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(counter.count(chunk) <= 50, "chunk over budget: {:?}", chunk);
        }
    }
}
