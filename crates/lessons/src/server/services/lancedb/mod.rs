//! LanceDB document store
//!
//! Stores documents with their embeddings in a single LanceDB table and
//! answers cosine nearest-neighbour queries.

pub mod connection;
pub mod models;
pub mod records;
pub mod search;
pub mod table_manager;

use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::server::services::document_store::{
  DocumentStore, NewDocument, RetrievedDocument, StoreError,
};
use crate::server::services::embeddings::{embed_checked, Embedder, EmbeddingError};
use connection::create_connection;
use models::{document_id, DocumentRecord};
use search::search_similar_documents;
use table_manager::TableManager;

/// [`DocumentStore`] backed by a LanceDB table
///
/// Ids are numbered from the row count seen at open, so only one process may
/// write to a collection at a time. Concurrent writers in separate processes
/// would hand out the same ids.
pub struct LanceDocumentStore {
  tables: TableManager,
  embedder: Arc<dyn Embedder>,
  /// Next sequential document number. Writers hold it exclusively for the
  /// whole commit, searches hold it shared.
  next_id: RwLock<u64>,
}

impl LanceDocumentStore {
  /// Open (or create) the collection under `data_dir`
  ///
  /// Fails with [`StoreError::DimensionMismatch`] when an existing collection
  /// was built with a different embedding size than `embedder` produces.
  pub async fn open(
    data_dir: &Path,
    collection: &str,
    embedder: Arc<dyn Embedder>,
  ) -> Result<Self, StoreError> {
    let connection = create_connection(data_dir).await?;
    let tables = TableManager::new(connection, collection.to_string());

    tables.ensure_table(embedder.dimension()).await?;
    let stored = tables.count_rows().await?;

    tracing::info!(
      path = %data_dir.display(),
      collection,
      documents = stored,
      model = embedder.model_id(),
      "Opened document store"
    );

    Ok(Self { tables, embedder, next_id: RwLock::new(stored as u64) })
  }

  pub fn collection(&self) -> &str {
    self.tables.table_name()
  }
}

#[async_trait]
impl DocumentStore for LanceDocumentStore {
  async fn add_documents(&self, documents: Vec<NewDocument>) -> Result<Vec<String>, StoreError> {
    if documents.is_empty() {
      return Ok(Vec::new());
    }

    let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
    let embeddings = embed_checked(self.embedder.as_ref(), &texts).await?;
    let created_at = Utc::now().to_rfc3339();

    let mut next_id = self.next_id.write().await;
    let records = documents
      .into_iter()
      .zip(embeddings)
      .enumerate()
      .map(|(offset, (document, embedding))| {
        let id = document_id(*next_id + offset as u64);
        DocumentRecord::new(id, document, embedding, created_at.clone())
      })
      .collect::<Result<Vec<_>, _>>()?;

    self.tables.add_records(&records, self.embedder.dimension()).await?;
    *next_id += records.len() as u64;

    Ok(records.into_iter().map(|r| r.id).collect())
  }

  async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, StoreError> {
    if top_k == 0 {
      return Ok(Vec::new());
    }

    match self.tables.count_rows().await {
      Ok(0) => return Ok(Vec::new()),
      Ok(_) => {}
      Err(e) => {
        tracing::warn!("Document store unavailable, skipping retrieval: {e}");
        return Ok(Vec::new());
      }
    }

    let query_embedding = embed_checked(self.embedder.as_ref(), &[query.to_string()])
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| EmbeddingError::Inference("no embedding returned for query".to_string()))?;

    let _reading = self.next_id.read().await;
    let table = match self.tables.get_table().await {
      Ok(table) => table,
      Err(e) => {
        tracing::warn!("Document store unavailable, skipping retrieval: {e}");
        return Ok(Vec::new());
      }
    };

    match search_similar_documents(&table, &query_embedding, top_k).await {
      Ok(documents) => Ok(documents),
      Err(e) => {
        tracing::warn!("Similarity search failed, returning no context: {e}");
        Ok(Vec::new())
      }
    }
  }

  async fn count(&self) -> Result<usize, StoreError> {
    self.tables.count_rows().await
  }
}
