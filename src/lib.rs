//! Aula - grounded question answering over lesson material
//!
//! Aula indexes a lesson's plain text, PDF pages and video transcript, answers
//! questions only when the library holds supporting material, and tells the
//! reader where that material is: the text file, a PDF page or page range,
//! or a minute range of the video.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `corpus` - Source types, manifests and provenance data
//! - `chunking` - Token-bounded recursive text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Exact nearest-neighbor index and its persistence
//! - `rag` - Confidence gate and answer generation
//! - `provenance` - Page and timestamp localization
//! - `library` - Build, query, persist and restore a library
//!
//! # Example
//!
//! ```rust,no_run
//! use aula::config::Settings;
//! use aula::corpus::{Corpus, RawData, Source};
//! use aula::library::{Components, Library, QueryOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let corpus = Corpus::new().with_source(Source::Text {
//!         text: "The cat sat on the mat.".to_string(),
//!     });
//!     let raw_data = RawData::from_corpus(&corpus)?;
//!
//!     let library = Library::build(&corpus, Components::from_settings(&settings)?).await?;
//!     let result = library
//!         .query("Where did the cat sit?", &raw_data, &QueryOptions::new(0.3))
//!         .await?;
//!     println!("{}", result.response);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod library;
pub mod openai;
pub mod provenance;
pub mod rag;
pub mod vector_store;

pub use error::{AulaError, ErrorKind, Result};
