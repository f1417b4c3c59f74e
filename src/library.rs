//! The searchable library: chunks, their vectors and the services that
//! answer questions over them.

use crate::chunking::{Chunk, TextChunk, TextChunker};
use crate::config::{Language, Prompts, Settings};
use crate::corpus::{Corpus, RawData};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{AulaError, Result};
use crate::provenance::Locator;
use crate::rag::{
    decide, messages, CompletionRequest, CompletionService, GateDecision, OpenAICompletion,
    QueryResult, RunId,
};
use crate::vector_store::{LibraryMetadata, ScoredChunk, SqliteIndexStore, VectorIndex};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Provenance data written next to a persisted library.
pub const RAW_DATA_FILE: &str = "raw_data.json";

/// Collaborators a library needs to build and answer.
#[derive(Clone)]
pub struct Components {
    pub chunker: Arc<TextChunker>,
    pub embedder: Arc<dyn Embedder>,
    pub completion: Arc<dyn CompletionService>,
    pub locator: Locator,
}

impl Components {
    /// OpenAI-backed components configured from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let timeout = Duration::from_secs(settings.completion.timeout_seconds);

        Ok(Self {
            chunker: Arc::new(TextChunker::from_settings(&settings.chunking)?),
            embedder: Arc::new(OpenAIEmbedder::from_settings(&settings.embedding, timeout)?),
            completion: Arc::new(OpenAICompletion::new(&settings.completion, prompts)?),
            locator: Locator::from_settings(&settings.provenance),
        })
    }
}

/// Per-query parameters.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum squared L2 distance a neighbor may have to support an answer.
    pub threshold: f32,
    /// Number of nearest neighbors handed to the gate.
    pub top_k: usize,
    pub language: Language,
    pub run_id: RunId,
}

impl QueryOptions {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            top_k: 3,
            language: Language::default(),
            run_id: RunId::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }
}

/// A built, read-only knowledge base.
pub struct Library {
    index: VectorIndex,
    components: Components,
}

impl Library {
    /// Chunk, embed and index every source of `corpus`, in order.
    #[instrument(skip_all, fields(sources = corpus.len()))]
    pub async fn build(corpus: &Corpus, components: Components) -> Result<Self> {
        let mut pending: Vec<TextChunk> = Vec::new();
        for source in corpus.iter() {
            let chunks =
                components
                    .chunker
                    .split(&source.indexed_text(), source.source_type(), pending.len());
            pending.extend(chunks);
        }

        if pending.is_empty() {
            return Err(AulaError::Config(
                "Corpus is empty: no source produced any text to index".to_string(),
            ));
        }

        info!("Embedding {} chunks", pending.len());
        let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
        let vectors = components.embedder.embed_batch(&texts).await?;

        if vectors.len() != pending.len() {
            return Err(AulaError::Embedding(format!(
                "Embedded {} of {} chunks",
                vectors.len(),
                pending.len()
            )));
        }

        let chunks: Vec<Chunk> = pending
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| Chunk::new(chunk, vector))
            .collect();

        let index = VectorIndex::build(chunks)?;
        info!(
            "Built library of {} chunks ({} dims)",
            index.len(),
            index.dimensions()
        );

        Ok(Self { index, components })
    }

    /// Answer `text`, citing where the supporting chunk came from.
    ///
    /// An unsupported query is not an error: it yields the fixed
    /// no-supporting-document response without calling the completion
    /// service.
    #[instrument(skip(self, raw_data, options), fields(run_id = %options.run_id))]
    pub async fn query(
        &self,
        text: &str,
        raw_data: &RawData,
        options: &QueryOptions,
    ) -> Result<QueryResult> {
        let neighbors = self.search(text, options.top_k).await?;

        let (context, best) = match decide(text, neighbors, options.threshold) {
            GateDecision::Closed { query } => {
                debug!("Gate closed: {}", messages::out_of_scope(options.language));
                return Ok(QueryResult {
                    query,
                    response: messages::no_supporting_document(options.language).to_string(),
                });
            }
            GateDecision::Open { context, best, .. } => (context, best),
        };

        debug!(
            "Gate open with {} chunks, best distance {}",
            context.len(),
            best.distance
        );

        let completion = self
            .components
            .completion
            .answer(CompletionRequest {
                query: text.to_string(),
                context_chunks: context.into_iter().map(|c| c.chunk.text).collect(),
                language: options.language,
                run_id: options.run_id,
            })
            .await?;

        let locator = &self.components.locator;
        let reference = locator.locate(&best.chunk.text, raw_data, best.chunk.source_type)?;

        Ok(QueryResult {
            query: text.to_string(),
            response: format!(
                "{}\n{}",
                completion.result_text,
                locator.render(&reference, options.language)
            ),
        })
    }

    /// Nearest chunks to `text`, without gating.
    pub async fn search(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query_vector = self.components.embedder.embed(text).await?;
        self.index.search_with_score(&query_vector, k)
    }

    /// Write the index to `dir`.
    pub fn persist(&self, dir: &Path) -> Result<LibraryMetadata> {
        SqliteIndexStore::new(dir).persist(&self.index, self.components.embedder.model())
    }

    /// Load a library written by [`Library::persist`] without re-embedding.
    #[instrument(skip(dir, components), fields(dir = %dir.display()))]
    pub fn restore(dir: &Path, components: Components) -> Result<Self> {
        let (index, metadata) = SqliteIndexStore::new(dir).restore()?;

        if index.dimensions() != components.embedder.dimensions() {
            return Err(AulaError::StorageFormat(format!(
                "Library has {} dimensions but the embedder produces {}",
                index.dimensions(),
                components.embedder.dimensions()
            )));
        }
        if metadata.embedding_model != components.embedder.model() {
            warn!(
                "Library was embedded with {} but queries use {}",
                metadata.embedding_model,
                components.embedder.model()
            );
        }

        info!("Restored library of {} chunks", index.len());
        Ok(Self { index, components })
    }

    /// Path of the provenance data for a library directory.
    pub fn raw_data_path(dir: &Path) -> PathBuf {
        dir.join(RAW_DATA_FILE)
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.index.chunks()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }
}
