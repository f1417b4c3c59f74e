//! Confidence gate between answering and declining.
//!
//! Distances are squared L2, so lower means closer. A neighbor supports the
//! query only when its distance is strictly below the threshold.

use crate::vector_store::ScoredChunk;
use tracing::debug;

/// Whether a query has enough support to be answered.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// No neighbor passed; the completion service must not be called.
    Closed { query: String },
    /// At least one neighbor passed.
    Open {
        query: String,
        /// Confident neighbors, closest first.
        context: Vec<ScoredChunk>,
        /// Closest neighbor, used for provenance.
        best: ScoredChunk,
    },
}

impl GateDecision {
    pub fn is_open(&self) -> bool {
        matches!(self, GateDecision::Open { .. })
    }

    pub fn query(&self) -> &str {
        match self {
            GateDecision::Closed { query } | GateDecision::Open { query, .. } => query,
        }
    }
}

/// Filter `neighbors` (ascending by distance) against `threshold`.
pub fn decide(query: &str, neighbors: Vec<ScoredChunk>, threshold: f32) -> GateDecision {
    let total = neighbors.len();
    let context: Vec<ScoredChunk> = neighbors
        .into_iter()
        .filter(|n| n.distance < threshold)
        .collect();

    debug!(
        "{} of {} neighbors under threshold {}",
        context.len(),
        total,
        threshold
    );

    match context.first().cloned() {
        Some(best) => GateDecision::Open {
            query: query.to_string(),
            context,
            best,
        },
        None => GateDecision::Closed {
            query: query.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{Chunk, ChunkId, TextChunk};
    use crate::corpus::SourceType;

    fn neighbor(text: &str, distance: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(
                TextChunk {
                    id: ChunkId::new(),
                    text: text.to_string(),
                    source_type: SourceType::Text,
                    sequence_index: 0,
                },
                vec![0.0],
            ),
            distance,
        }
    }

    fn neighbors() -> Vec<ScoredChunk> {
        vec![
            neighbor("a", 0.1),
            neighbor("b", 0.35),
            neighbor("c", 0.6),
        ]
    }

    #[test]
    fn test_open_keeps_only_confident_neighbors() {
        match decide("q", neighbors(), 0.4) {
            GateDecision::Open { context, best, .. } => {
                assert_eq!(context.len(), 2);
                assert_eq!(best.chunk.text, "a");
            }
            GateDecision::Closed { .. } => panic!("gate should be open"),
        }
    }

    #[test]
    fn test_closed_when_nothing_passes() {
        let decision = decide("q", neighbors(), 0.05);
        assert_eq!(
            decision,
            GateDecision::Closed {
                query: "q".to_string()
            }
        );
        assert!(!decide("q", Vec::new(), 1.0).is_open());
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!decide("q", vec![neighbor("a", 0.3)], 0.3).is_open());
        assert!(decide("q", vec![neighbor("a", 0.3)], 0.31).is_open());
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let thresholds = [0.0, 0.05, 0.1, 0.2, 0.3, 0.35, 0.4, 0.6, 0.61, 1.0];
        for (i, low) in thresholds.iter().enumerate() {
            for high in &thresholds[i..] {
                if decide("q", neighbors(), *low).is_open() {
                    assert!(decide("q", neighbors(), *high).is_open());
                }
            }
        }
    }
}
