//! Vector index over embedded chunks.
//!
//! Search is exact: every query is compared against every stored vector by
//! squared Euclidean distance. Libraries are small enough that brute force
//! stays fast and keeps results reproducible.

mod sqlite;

pub use sqlite::{ChunkRecord, LibraryMetadata, SqliteIndexStore, SCHEMA_VERSION};

use crate::chunking::Chunk;
use crate::error::{AulaError, Result};
use tracing::{debug, instrument};

/// A search result with its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Squared L2 distance (lower is closer).
    pub distance: f32,
}

/// Read-only nearest-neighbor index.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from embedded chunks.
    ///
    /// Fails when `chunks` is empty or when vectors disagree in width.
    #[instrument(skip(chunks), fields(count = chunks.len()))]
    pub fn build(chunks: Vec<Chunk>) -> Result<Self> {
        let dimensions = match chunks.first() {
            Some(first) => first.dimensions(),
            None => {
                return Err(AulaError::Config(
                    "Cannot build an index without chunks".to_string(),
                ))
            }
        };

        if dimensions == 0 {
            return Err(AulaError::Index("Chunk vectors are empty".to_string()));
        }

        if let Some(bad) = chunks.iter().find(|c| c.dimensions() != dimensions) {
            return Err(AulaError::Index(format!(
                "Chunk {} has {} dimensions, expected {}",
                bad.id,
                bad.dimensions(),
                dimensions
            )));
        }

        debug!("Built index of {} chunks ({} dims)", chunks.len(), dimensions);
        Ok(Self { chunks, dimensions })
    }

    /// The `k` nearest chunks, closest first.
    ///
    /// Equal distances keep insertion order. `k` beyond the index size
    /// returns every chunk.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimensions {
            return Err(AulaError::Index(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (i, squared_l2(query, &chunk.vector)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                distance,
            })
            .collect())
    }

    /// Same as [`VectorIndex::search`]; the distance on each result is the
    /// raw score used by the confidence gate.
    pub fn search_with_score(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        self.search(query, k)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Stored chunks in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
}

/// Squared Euclidean distance. Vectors must have equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
