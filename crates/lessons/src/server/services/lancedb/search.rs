//! Vector search operations and result processing for LanceDB

use arrow::array::{Array, Float32Array, StringArray};
use arrow::record_batch::RecordBatch;
use futures::stream::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use super::records::EMBEDDING_COLUMN;
use crate::server::services::document_store::{Metadata, RetrievedDocument, StoreError};

/// Cosine nearest-neighbour search, most similar first
pub async fn search_similar_documents(
  table: &Table,
  query_embedding: &[f32],
  limit: usize,
) -> Result<Vec<RetrievedDocument>, StoreError> {
  let mut results_stream = table
    .vector_search(query_embedding)
    .map_err(search_error)?
    .column(EMBEDDING_COLUMN)
    .distance_type(DistanceType::Cosine)
    .limit(limit)
    .execute()
    .await
    .map_err(search_error)?;

  let mut documents = Vec::new();
  while let Some(batch_result) = results_stream.next().await {
    let batch = batch_result.map_err(search_error)?;
    documents.extend(process_result_batch(&batch)?);
  }

  rank(&mut documents, limit);
  if documents.is_empty() {
    tracing::debug!("No similar documents found");
  }
  Ok(documents)
}

fn search_error(e: lancedb::Error) -> StoreError {
  StoreError::Connection(format!("Vector search failed: {e}"))
}

/// Sort by non-increasing similarity and keep at most `limit` entries
pub fn rank(documents: &mut Vec<RetrievedDocument>, limit: usize) {
  documents.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
  documents.truncate(limit);
}

fn process_result_batch(batch: &RecordBatch) -> Result<Vec<RetrievedDocument>, StoreError> {
  let ids = string_column(batch, "id")?;
  let texts = string_column(batch, "text")?;
  let metadata = string_column(batch, "metadata")?;
  let distances = batch
    .column_by_name("_distance")
    .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

  let documents = (0..batch.num_rows())
    .map(|row| RetrievedDocument {
      id: ids.value(row).to_string(),
      text: texts.value(row).to_string(),
      metadata: parse_metadata(metadata.value(row)),
      similarity: distance_to_similarity(distance_at(distances, row)),
    })
    .collect();

  Ok(documents)
}

fn string_column<'a>(
  batch: &'a RecordBatch,
  column_name: &str,
) -> Result<&'a StringArray, StoreError> {
  batch
    .column_by_name(column_name)
    .ok_or_else(|| StoreError::Connection(format!("Missing '{column_name}' column")))?
    .as_any()
    .downcast_ref::<StringArray>()
    .ok_or_else(|| {
      StoreError::Connection(format!("Failed to cast '{column_name}' column to StringArray"))
    })
}

/// Missing distances rank last
fn distance_at(distances: Option<&Float32Array>, row: usize) -> f32 {
  match distances {
    Some(array) if row < array.len() && !array.is_null(row) => array.value(row),
    _ => 2.0,
  }
}

/// Cosine distance lies in [0, 2]; similarity is the cosine itself
fn distance_to_similarity(distance: f32) -> f32 {
  1.0 - distance
}

fn parse_metadata(raw: &str) -> Metadata {
  serde_json::from_str(raw).unwrap_or_else(|e| {
    tracing::warn!("Ignoring unreadable document metadata: {e}");
    Metadata::new()
  })
}
