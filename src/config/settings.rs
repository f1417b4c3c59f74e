//! Configuration settings for Aula.

use crate::error::{AulaError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
///
/// Unknown keys are rejected in every section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub provenance: ProvenanceSettings,
    pub completion: CompletionSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory of the library used when no `--library` is given.
    pub library_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.aula".to_string(),
            library_dir: "~/.aula/library".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// BPE encoding used to measure chunk sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenEncoding {
    /// Encoding of the GPT-3 completion family.
    #[default]
    P50kBase,
    /// Encoding of the GPT-3.5/4 chat family and the v3 embedding models.
    Cl100kBase,
}

impl std::str::FromStr for TokenEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p50k_base" | "p50k" => Ok(TokenEncoding::P50kBase),
            "cl100k_base" | "cl100k" => Ok(TokenEncoding::Cl100kBase),
            _ => Err(format!("Unknown token encoding: {}", s)),
        }
    }
}

impl std::fmt::Display for TokenEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenEncoding::P50kBase => write!(f, "p50k_base"),
            TokenEncoding::Cl100kBase => write!(f, "cl100k_base"),
        }
    }
}

/// Content chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkingSettings {
    /// Maximum chunk size in tokens.
    pub chunk_size: usize,
    /// Tokens shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Tokenizer encoding used to count tokens.
    pub encoding: TokenEncoding,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 20,
            encoding: TokenEncoding::P50kBase,
        }
    }
}

/// Retrieval and confidence gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrievalSettings {
    /// Number of nearest neighbors considered by the gate.
    pub top_k: usize,
    /// Maximum squared L2 distance accepted by `ask`.
    pub threshold: f32,
    /// Maximum squared L2 distance accepted by `chat`.
    pub chat_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.3,
            chat_threshold: 0.4,
        }
    }
}

/// Provenance locator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvenanceSettings {
    /// Score gap at or below which the two best pages are reported as a range.
    pub ambiguity_margin: f64,
    /// Characters taken from each end of a chunk when matching transcript segments.
    pub video_window_chars: usize,
    /// Render page numbers starting at 1 instead of raw indices.
    pub one_based_pages: bool,
}

impl Default for ProvenanceSettings {
    fn default() -> Self {
        Self {
            ambiguity_margin: 0.15,
            video_window_chars: 500,
            one_based_pages: false,
        }
    }
}

/// Answer language, used both as a prompt hint and for canned messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Portuguese,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "portuguese" | "pt" | "pt-br" => Ok(Language::Portuguese),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Portuguese => write!(f, "portuguese"),
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionSettings {
    /// Chat model used to phrase grounded answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Language of answers and messages.
    pub language: Language,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            language: Language::English,
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AulaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Return a copy with one dotted key (e.g. `retrieval.threshold`) replaced.
    ///
    /// The value is parsed as a TOML literal first and falls back to a plain
    /// string, so `0.25`, `true` and `gpt-4o` all work unquoted. Optional
    /// keys that are unset do not appear in the serialized sections, so key
    /// names are checked when the result is deserialized back.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self> {
        let mut root = toml::Value::try_from(self).map_err(|e| AulaError::Config(e.to_string()))?;

        let parsed = toml::from_str::<toml::Table>(&format!("v = {}", value))
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| toml::Value::String(value.to_string()));

        let mut parts = key.split('.').peekable();
        let mut cursor = &mut root;
        while let Some(part) = parts.next() {
            let table = cursor
                .as_table_mut()
                .ok_or_else(|| AulaError::Config(format!("'{}' is not a section", key)))?;
            if parts.peek().is_none() {
                table.insert(part.to_string(), parsed);
                break;
            }
            cursor = table
                .get_mut(part)
                .ok_or_else(|| AulaError::Config(format!("Unknown section in: {}", key)))?;
        }

        let updated: Settings = root
            .try_into()
            .map_err(|e: toml::de::Error| AulaError::Config(format!("Cannot set {}: {}", key, e)))?;
        Ok(updated)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aula")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded default library directory path.
    pub fn library_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.library_dir)
    }
}
