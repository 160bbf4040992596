//! Arrow RecordBatch conversion utilities for LanceDB

use arrow::array::{Array, FixedSizeListArray, FixedSizeListBuilder, Float32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::models::DocumentRecord;
use crate::server::services::document_store::StoreError;

pub const EMBEDDING_COLUMN: &str = "embedding";

/// Arrow schema of the documents table for a given embedding dimension
pub fn document_schema(embedding_dimension: usize) -> Arc<Schema> {
  Arc::new(Schema::new(vec![
    Field::new("id", DataType::Utf8, false),
    Field::new("text", DataType::Utf8, false),
    Field::new("metadata", DataType::Utf8, false),
    Field::new(
      EMBEDDING_COLUMN,
      DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        embedding_dimension as i32,
      ),
      false,
    ),
    Field::new("created_at", DataType::Utf8, false),
  ]))
}

/// Embedding dimension recorded in a table schema
pub fn embedding_dimension(schema: &Schema) -> Option<usize> {
  match schema.field_with_name(EMBEDDING_COLUMN).ok()?.data_type() {
    DataType::FixedSizeList(_, size) => Some(*size as usize),
    _ => None,
  }
}

/// Convert a batch of records into a single RecordBatch
pub fn records_to_arrow_batch(
  records: &[DocumentRecord],
  embedding_dimension: usize,
) -> Result<RecordBatch, StoreError> {
  if records.is_empty() {
    return Err(StoreError::Write("Cannot create RecordBatch from empty records".to_string()));
  }

  let schema = document_schema(embedding_dimension);
  let columns: Vec<Arc<dyn Array>> = vec![
    Arc::new(string_column(records, |r| &r.id)),
    Arc::new(string_column(records, |r| &r.text)),
    Arc::new(string_column(records, |r| &r.metadata)),
    Arc::new(embedding_column(records, embedding_dimension)?),
    Arc::new(string_column(records, |r| &r.created_at)),
  ];

  RecordBatch::try_new(schema, columns)
    .map_err(|e| StoreError::Write(format!("Failed to create RecordBatch: {e}")))
}

fn string_column<F>(records: &[DocumentRecord], field_fn: F) -> StringArray
where
  F: Fn(&DocumentRecord) -> &str,
{
  StringArray::from(records.iter().map(|r| Some(field_fn(r))).collect::<Vec<_>>())
}

fn embedding_column(
  records: &[DocumentRecord],
  embedding_dimension: usize,
) -> Result<FixedSizeListArray, StoreError> {
  let mut builder = FixedSizeListBuilder::new(
    Float32Array::builder(embedding_dimension * records.len()),
    embedding_dimension as i32,
  );

  for record in records {
    if record.embedding.len() != embedding_dimension {
      return Err(StoreError::Write(format!(
        "Embedding for {} has {} values, table expects {}",
        record.id,
        record.embedding.len(),
        embedding_dimension
      )));
    }
    builder.values().append_slice(&record.embedding);
    builder.append(true);
  }

  Ok(builder.finish())
}
