//! SQLite persistence for a built vector index.
//!
//! A library directory holds two files:
//!
//! - `vectors.db`: one row per chunk with its embedding as a little-endian
//!   f32 blob, plus a single-row `index_info` table.
//! - `metadata.json`: chunk ids, source types, sequence indices and texts,
//!   aligned by position with the `vectors` rows.
//!
//! Restoring never re-embeds. Any disagreement between the two files is
//! reported as a storage format error instead of being repaired.

use super::VectorIndex;
use crate::chunking::{Chunk, ChunkId, TextChunk};
use crate::corpus::SourceType;
use crate::error::{AulaError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Version of the on-disk layout.
pub const SCHEMA_VERSION: u32 = 1;

const VECTORS_FILE: &str = "vectors.db";
const METADATA_FILE: &str = "metadata.json";

/// Chunk fields stored in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub source_type: SourceType,
    pub sequence_index: usize,
    pub text: String,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    pub schema_version: u32,
    pub dimensions: usize,
    pub embedding_model: String,
    pub built_at: DateTime<Utc>,
    pub chunks: Vec<ChunkRecord>,
}

/// Reads and writes a library directory.
pub struct SqliteIndexStore {
    dir: PathBuf,
}

impl SqliteIndexStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Whether both library files are present.
    pub fn exists(&self) -> bool {
        self.vectors_path().is_file() && self.metadata_path().is_file()
    }

    /// Write `index`, replacing any library already in the directory.
    #[instrument(skip(self, index), fields(dir = %self.dir.display(), count = index.len()))]
    pub fn persist(&self, index: &VectorIndex, embedding_model: &str) -> Result<LibraryMetadata> {
        std::fs::create_dir_all(&self.dir)?;

        let vectors_path = self.vectors_path();
        if vectors_path.exists() {
            std::fs::remove_file(&vectors_path)?;
        }

        let mut conn = Connection::open(&vectors_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE vectors (
                position INTEGER PRIMARY KEY,
                embedding BLOB NOT NULL
            );

            CREATE TABLE index_info (
                schema_version INTEGER NOT NULL,
                dimensions INTEGER NOT NULL,
                chunk_count INTEGER NOT NULL
            );
            "#,
        )?;

        let tx = conn.transaction()?;
        for (position, chunk) in index.chunks().iter().enumerate() {
            tx.execute(
                "INSERT INTO vectors (position, embedding) VALUES (?1, ?2)",
                params![position as i64, embedding_to_bytes(&chunk.vector)],
            )?;
        }
        tx.execute(
            "INSERT INTO index_info (schema_version, dimensions, chunk_count) VALUES (?1, ?2, ?3)",
            params![
                SCHEMA_VERSION,
                index.dimensions() as i64,
                index.len() as i64
            ],
        )?;
        tx.commit()?;

        let metadata = LibraryMetadata {
            schema_version: SCHEMA_VERSION,
            dimensions: index.dimensions(),
            embedding_model: embedding_model.to_string(),
            built_at: Utc::now(),
            chunks: index
                .chunks()
                .iter()
                .map(|c| ChunkRecord {
                    id: c.id,
                    source_type: c.source_type,
                    sequence_index: c.sequence_index,
                    text: c.text.clone(),
                })
                .collect(),
        };
        std::fs::write(self.metadata_path(), serde_json::to_string_pretty(&metadata)?)?;

        info!("Persisted {} vectors to {:?}", index.len(), self.dir);
        Ok(metadata)
    }

    /// Load only `metadata.json`.
    pub fn load_metadata(&self) -> Result<LibraryMetadata> {
        let path = self.metadata_path();
        if !path.is_file() {
            return Err(AulaError::StorageFormat(format!("Missing {}", path.display())));
        }

        let content = std::fs::read_to_string(&path)?;
        let metadata: LibraryMetadata = serde_json::from_str(&content).map_err(|e| {
            AulaError::StorageFormat(format!("Unreadable {}: {}", path.display(), e))
        })?;

        if metadata.schema_version != SCHEMA_VERSION {
            return Err(AulaError::StorageFormat(format!(
                "{} has schema version {}, expected {}",
                METADATA_FILE, metadata.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(metadata)
    }

    /// Load the index written by [`SqliteIndexStore::persist`].
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn restore(&self) -> Result<(VectorIndex, LibraryMetadata)> {
        let metadata = self.load_metadata()?;

        let vectors_path = self.vectors_path();
        if !vectors_path.is_file() {
            return Err(AulaError::StorageFormat(format!(
                "Missing {}",
                vectors_path.display()
            )));
        }
        let conn = Connection::open_with_flags(&vectors_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let (schema_version, dimensions, chunk_count): (u32, i64, i64) = conn
            .query_row(
                "SELECT schema_version, dimensions, chunk_count FROM index_info",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| AulaError::StorageFormat(format!("Unreadable index_info: {}", e)))?;

        if schema_version != SCHEMA_VERSION {
            return Err(AulaError::StorageFormat(format!(
                "{} has schema version {}, expected {}",
                VECTORS_FILE, schema_version, SCHEMA_VERSION
            )));
        }
        if dimensions as usize != metadata.dimensions {
            return Err(AulaError::StorageFormat(format!(
                "{} records {} dimensions but {} records {}",
                VECTORS_FILE, dimensions, METADATA_FILE, metadata.dimensions
            )));
        }
        if chunk_count as usize != metadata.chunks.len() {
            return Err(AulaError::StorageFormat(format!(
                "{} records {} chunks but {} lists {}",
                VECTORS_FILE,
                chunk_count,
                METADATA_FILE,
                metadata.chunks.len()
            )));
        }

        let mut stmt = conn.prepare("SELECT position, embedding FROM vectors ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if rows.len() != metadata.chunks.len() {
            return Err(AulaError::StorageFormat(format!(
                "{} has {} vector rows for {} chunks",
                VECTORS_FILE,
                rows.len(),
                metadata.chunks.len()
            )));
        }

        let expected_bytes = metadata.dimensions * 4;
        let mut chunks = Vec::with_capacity(rows.len());
        for (expected_position, ((position, blob), record)) in
            rows.into_iter().zip(metadata.chunks.iter()).enumerate()
        {
            if position != expected_position as i64 {
                return Err(AulaError::StorageFormat(format!(
                    "Vector positions are not contiguous: found {} where {} was expected",
                    position, expected_position
                )));
            }
            if blob.len() != expected_bytes {
                return Err(AulaError::StorageFormat(format!(
                    "Vector at position {} has {} bytes, expected {}",
                    position,
                    blob.len(),
                    expected_bytes
                )));
            }

            chunks.push(Chunk::new(
                TextChunk {
                    id: record.id,
                    text: record.text.clone(),
                    source_type: record.source_type,
                    sequence_index: record.sequence_index,
                },
                bytes_to_embedding(&blob),
            ));
        }

        let index = VectorIndex::build(chunks)
            .map_err(|e| AulaError::StorageFormat(format!("Persisted index is invalid: {}", e)))?;

        debug!("Restored {} vectors from {:?}", index.len(), self.dir);
        Ok((index, metadata))
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
