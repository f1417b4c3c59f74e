//! Content chunking for breaking sources into searchable units.
//!
//! Sources are split into token-bounded, overlapping pieces. Each piece gets
//! an opaque id, its source type and a library-wide sequence index.

mod splitter;
mod tokenizer;

pub use splitter::{RecursiveSplitter, DEFAULT_SEPARATORS};
pub use tokenizer::{TiktokenCounter, TokenCounter};

use crate::config::ChunkingSettings;
use crate::corpus::SourceType;
use crate::error::{AulaError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Opaque chunk identifier, unique within a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(Uuid);

impl ChunkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A piece of source text that has not been embedded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: ChunkId,
    pub text: String,
    pub source_type: SourceType,
    pub sequence_index: usize,
}

/// A searchable unit: chunk text plus its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_type: SourceType,
    pub sequence_index: usize,
    pub vector: Vec<f32>,
}

impl Chunk {
    /// Attach an embedding to a text chunk.
    pub fn new(chunk: TextChunk, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text,
            source_type: chunk.source_type,
            sequence_index: chunk.sequence_index,
            vector,
        }
    }

    /// Embedding width.
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk size in tokens.
    pub chunk_size: usize,
    /// Tokens carried over between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 20,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(AulaError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AulaError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits source text into [`TextChunk`]s.
pub struct TextChunker {
    splitter: RecursiveSplitter,
}

impl TextChunker {
    /// Create a chunker with a custom token counter.
    pub fn new(config: ChunkingConfig, counter: Arc<dyn TokenCounter>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            splitter: RecursiveSplitter::new(config.chunk_size, config.chunk_overlap, counter),
        })
    }

    /// Create a chunker counting tokens with the configured tiktoken encoding.
    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        let counter = Arc::new(TiktokenCounter::new(settings.encoding)?);
        Self::new(
            ChunkingConfig {
                chunk_size: settings.chunk_size,
                chunk_overlap: settings.chunk_overlap,
            },
            counter,
        )
    }

    pub fn splitter(&self) -> &RecursiveSplitter {
        &self.splitter
    }

    /// Split one source.
    ///
    /// `running_count` is the number of chunks already produced for earlier
    /// sources of the same build; the i-th chunk gets `i + running_count` as
    /// its sequence index.
    pub fn split(&self, text: &str, source_type: SourceType, running_count: usize) -> Vec<TextChunk> {
        let chunks: Vec<TextChunk> = self
            .splitter
            .split_text(text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextChunk {
                id: ChunkId::new(),
                text,
                source_type,
                sequence_index: i + running_count,
            })
            .collect();

        debug!(
            "Split {} source into {} chunks (offset {})",
            source_type,
            chunks.len(),
            running_count
        );
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenEncoding;
    use std::collections::HashSet;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> TextChunker {
        let counter = Arc::new(TiktokenCounter::new(TokenEncoding::P50kBase).unwrap());
        TextChunker::new(
            ChunkingConfig {
                chunk_size,
                chunk_overlap,
            },
            counter,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config() {
        let counter: Arc<dyn TokenCounter> =
            Arc::new(TiktokenCounter::new(TokenEncoding::P50kBase).unwrap());
        let zero = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(TextChunker::new(zero, counter.clone()).is_err());

        let overlap = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        };
        assert!(TextChunker::new(overlap, counter).is_err());
    }

    #[test]
    fn test_short_source_single_chunk() {
        let chunks = chunker(500, 20).split("The cat sat on the mat.", SourceType::Text, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "The cat sat on the mat.");
        assert_eq!(chunks[0].source_type, SourceType::Text);
        assert_eq!(chunks[0].sequence_index, 0);
    }

    #[test]
    fn test_sequence_index_offsets_by_running_count() {
        let chunker = chunker(30, 5);
        let text = (0..20)
            .map(|i| format!("Line {} of the lecture notes.", i))
            .collect::<Vec<_>>()
            .join("\n");

        let first = chunker.split(&text, SourceType::Text, 0);
        let second = chunker.split(&text, SourceType::Pdf, first.len());

        assert!(first.len() > 1);
        let indices: Vec<usize> = first
            .iter()
            .chain(second.iter())
            .map(|c| c.sequence_index)
            .collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(second[0].sequence_index, first.len());

        let ids: HashSet<ChunkId> = first.iter().chain(second.iter()).map(|c| c.id).collect();
        assert_eq!(ids.len(), first.len() + second.len());
    }

    #[test]
    fn test_chunk_id_serializes_as_uuid_string() {
        let id = ChunkId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
