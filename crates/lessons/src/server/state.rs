//! Shared application state

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::server::services::completion::CompletionClient;
use crate::server::services::document_store::DocumentStore;
use crate::server::types::RetrievalStatus;

/// Whether lesson requests can be grounded in stored documents
#[derive(Clone)]
pub enum Retrieval {
  Available(Arc<dyn DocumentStore>),
  Unavailable { reason: String },
}

impl Retrieval {
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable { reason: reason.into() }
  }

  pub async fn status(&self) -> RetrievalStatus {
    match self {
      Retrieval::Available(store) => match store.count().await {
        Ok(documents) => {
          RetrievalStatus { available: true, documents: Some(documents), reason: None }
        }
        Err(e) => RetrievalStatus { available: true, documents: None, reason: Some(e.to_string()) },
      },
      Retrieval::Unavailable { reason } => {
        RetrievalStatus { available: false, documents: None, reason: Some(reason.clone()) }
      }
    }
  }
}

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
  pub retrieval: Retrieval,
  pub completion: Arc<dyn CompletionClient>,
  /// Directory for temporary PDF files
  pub pdf_dir: PathBuf,
  /// Passages retrieved per lesson request
  pub top_k: usize,
  pub started_at: DateTime<Utc>,
}

impl AppState {
  pub fn new(
    retrieval: Retrieval,
    completion: Arc<dyn CompletionClient>,
    pdf_dir: PathBuf,
    top_k: usize,
  ) -> Self {
    Self { retrieval, completion, pdf_dir, top_k, started_at: Utc::now() }
  }

  /// Texts of the passages most similar to `query`, most similar first
  ///
  /// Never fails: an unavailable store or a failed search yields no context.
  pub async fn retrieve_context(&self, query: &str) -> Vec<String> {
    let store = match &self.retrieval {
      Retrieval::Available(store) => store,
      Retrieval::Unavailable { reason } => {
        tracing::warn!("Retrieval unavailable ({reason}), generating without context");
        return Vec::new();
      }
    };

    match store.search(query, self.top_k).await {
      Ok(documents) => {
        tracing::debug!(count = documents.len(), "Retrieved context passages");
        documents.into_iter().map(|d| d.text).collect()
      }
      Err(e) => {
        tracing::warn!("Context retrieval failed, generating without context: {e}");
        Vec::new()
      }
    }
  }
}
