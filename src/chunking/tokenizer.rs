//! Token counting with the OpenAI BPE encodings.

use crate::config::TokenEncoding;
use crate::error::{AulaError, Result};
use tiktoken_rs::CoreBPE;

/// Measures text length in tokens.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Counts tokens with a tiktoken BPE encoding.
///
/// Special-token markers such as `<|endoftext|>` are encoded as ordinary
/// text, so user content can never be rejected by the counter.
pub struct TiktokenCounter {
    bpe: CoreBPE,
    encoding: TokenEncoding,
}

impl TiktokenCounter {
    pub fn new(encoding: TokenEncoding) -> Result<Self> {
        let bpe = match encoding {
            TokenEncoding::P50kBase => tiktoken_rs::p50k_base(),
            TokenEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
        }
        .map_err(|e| AulaError::Tokenizer(format!("Failed to load {}: {}", encoding, e)))?;

        Ok(Self { bpe, encoding })
    }

    pub fn encoding(&self) -> TokenEncoding {
        self.encoding
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_tokens() {
        let counter = TiktokenCounter::new(TokenEncoding::P50kBase).unwrap();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("hello world") >= 2);
        assert!(counter.count("hello world") < counter.count("hello world, hello again world"));
    }

    #[test]
    fn test_special_tokens_are_plain_text() {
        let counter = TiktokenCounter::new(TokenEncoding::Cl100kBase).unwrap();
        assert!(counter.count("<|endoftext|>") > 1);
    }
}
