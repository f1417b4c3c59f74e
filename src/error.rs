//! Error types for Aula.

use thiserror::Error;

/// Library-level error type for Aula operations.
#[derive(Error, Debug)]
pub enum AulaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Malformed source data: {0}")]
    DataShape(String),

    #[error("Incompatible persisted library: {0}")]
    StorageFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Coarse classification of [`AulaError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad settings, bad manifest or an empty corpus.
    Configuration,
    /// The embedding, completion or tokenizer collaborator failed.
    Service,
    /// Provenance data does not have the shape its source type needs.
    DataShape,
    /// A persisted library cannot be loaded as-is.
    StorageFormat,
    /// Vector dimensionality disagreement.
    Index,
    /// Filesystem or (de)serialization failure.
    Io,
}

impl AulaError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AulaError::Config(_) | AulaError::TomlParse(_) => ErrorKind::Configuration,
            AulaError::Tokenizer(_)
            | AulaError::Embedding(_)
            | AulaError::Completion(_)
            | AulaError::OpenAI(_)
            | AulaError::Http(_) => ErrorKind::Service,
            AulaError::DataShape(_) => ErrorKind::DataShape,
            AulaError::StorageFormat(_) | AulaError::Database(_) => ErrorKind::StorageFormat,
            AulaError::Index(_) => ErrorKind::Index,
            AulaError::Io(_) | AulaError::Json(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for Aula operations.
pub type Result<T> = std::result::Result<T, AulaError>;
