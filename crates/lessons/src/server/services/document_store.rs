//! Document store abstraction for context retrieval
//!
//! Handlers only see this trait, so the LanceDB implementation can be
//! replaced (or faked in tests) without touching request handling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::server::services::embeddings::EmbeddingError;

/// Scalar metadata value attached to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
  Bool(bool),
  Integer(i64),
  Float(f64),
  Text(String),
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// A document waiting to be ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
  pub text: String,
  #[serde(default)]
  pub metadata: Metadata,
}

impl NewDocument {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), metadata: Metadata::new() }
  }
}

/// A stored document returned by a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
  pub id: String,
  pub text: String,
  pub metadata: Metadata,
  /// Cosine similarity to the query, higher is more similar
  pub similarity: f32,
}

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Failed to write document batch: {0}")]
  Write(String),

  #[error(transparent)]
  Embedding(#[from] EmbeddingError),

  #[error(
    "Collection '{collection}' stores {stored}-dimensional embeddings \
     but the embedder produces {expected}"
  )]
  DimensionMismatch { collection: String, stored: usize, expected: usize },

  #[error("Document store unavailable: {0}")]
  Connection(String),
}

/// Persistent collection of embedded documents
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Embed and persist a batch; either every document is stored or none is
  async fn add_documents(&self, documents: Vec<NewDocument>) -> Result<Vec<String>, StoreError>;

  /// Up to `top_k` stored documents, most similar first
  async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, StoreError>;

  /// Number of stored documents
  async fn count(&self) -> Result<usize, StoreError>;
}

/// Ingest plain texts without metadata
pub async fn add_texts(
  store: &dyn DocumentStore,
  texts: Vec<String>,
) -> Result<Vec<String>, StoreError> {
  store.add_documents(texts.into_iter().map(NewDocument::new).collect()).await
}
