//! TF-IDF cosine similarity.
//!
//! Weighting follows scikit-learn's `TfidfVectorizer` defaults: lowercased
//! text, tokens of two or more word characters, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1`, raw term counts and L2-normalized rows.
//! The vocabulary is fitted on the query plus the candidates of each call.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

fn term_counts(text: &str) -> BTreeMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut counts = BTreeMap::new();
    for token in TOKEN_REGEX.find_iter(&lowered) {
        *counts.entry(token.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity of `query` against each of `candidates`.
///
/// Documents without any token get a zero vector and score 0.
pub fn similarities(query: &str, candidates: &[String]) -> Vec<f64> {
    let counts: Vec<BTreeMap<String, usize>> = std::iter::once(query)
        .chain(candidates.iter().map(String::as_str))
        .map(term_counts)
        .collect();

    let n = counts.len() as f64;
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for doc in &counts {
        for term in doc.keys() {
            *document_frequency.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let idf = |term: &str| -> f64 {
        let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    };

    let vectors: Vec<BTreeMap<&str, f64>> = counts
        .iter()
        .map(|doc| {
            let mut weights: BTreeMap<&str, f64> = doc
                .iter()
                .map(|(term, count)| (term.as_str(), *count as f64 * idf(term)))
                .collect();
            let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for w in weights.values_mut() {
                    *w /= norm;
                }
            }
            weights
        })
        .collect();

    let (query_vector, candidate_vectors) = match vectors.split_first() {
        Some(split) => split,
        None => return Vec::new(),
    };

    candidate_vectors
        .iter()
        .map(|candidate| {
            query_vector
                .iter()
                .filter_map(|(term, w)| candidate.get(term).map(|c| w * c))
                .sum()
        })
        .collect()
}
