//! Retrieval-augmented answering.
//!
//! A query only reaches the completion service when the confidence gate is
//! open; otherwise it gets a fixed out-of-scope reply.

mod completion;
pub mod gate;
pub mod messages;

pub use completion::{Completion, CompletionRequest, CompletionService, OpenAICompletion};
pub use gate::{decide, GateDecision};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation identifier for one query, recorded on its tracing span and
/// sent with the completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of one retrieval cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    /// Generated answer followed by its source reference, or the
    /// no-supporting-document message.
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_query_result_json() {
        let result = QueryResult {
            query: "q".to_string(),
            response: "a\nb".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["query"], "q");
        assert_eq!(json["response"], "a\nb");
    }
}
