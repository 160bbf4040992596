//! Row model for the documents table

use crate::server::services::document_store::{NewDocument, StoreError};

/// One row of the documents table
#[derive(Debug, Clone)]
pub struct DocumentRecord {
  pub id: String,
  pub text: String,
  /// Metadata serialized as a JSON object
  pub metadata: String,
  pub embedding: Vec<f32>,
  pub created_at: String,
}

impl DocumentRecord {
  pub fn new(
    id: String,
    document: NewDocument,
    embedding: Vec<f32>,
    created_at: String,
  ) -> Result<Self, StoreError> {
    let metadata = serde_json::to_string(&document.metadata)
      .map_err(|e| StoreError::Write(format!("Unserializable metadata for {id}: {e}")))?;

    Ok(Self { id, text: document.text, metadata, embedding, created_at })
  }
}

/// Sequential identifier for the `n`th stored document
pub fn document_id(n: u64) -> String {
  format!("doc_{n}")
}
