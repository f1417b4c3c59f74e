//! Configuration module for Aula.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, CompletionSettings, EmbeddingSettings, GeneralSettings, Language,
    PromptSettings, ProvenanceSettings, RetrievalSettings, Settings, TokenEncoding,
};
