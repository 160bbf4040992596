//! Table management operations for LanceDB

use arrow::record_batch::RecordBatchIterator;
use lancedb::{Connection, Table};

use super::models::DocumentRecord;
use super::records::{document_schema, embedding_dimension, records_to_arrow_batch};
use crate::server::services::document_store::StoreError;

/// Table manager for LanceDB operations
pub struct TableManager {
  connection: Connection,
  table_name: String,
}

impl TableManager {
  pub fn new(connection: Connection, table_name: String) -> Self {
    Self { connection, table_name }
  }

  pub fn table_name(&self) -> &str {
    &self.table_name
  }

  /// Check if the target table exists
  pub async fn table_exists(&self) -> Result<bool, StoreError> {
    let tables = self
      .connection
      .table_names()
      .execute()
      .await
      .map_err(|e| StoreError::Connection(format!("Failed to list tables: {e}")))?;
    Ok(tables.contains(&self.table_name))
  }

  /// Get the table instance
  pub async fn get_table(&self) -> Result<Table, StoreError> {
    self
      .connection
      .open_table(&self.table_name)
      .execute()
      .await
      .map_err(|e| {
        StoreError::Connection(format!("Failed to open table '{}': {e}", self.table_name))
      })
  }

  /// Create the table for `dimension`-sized embeddings, or verify the existing one matches
  pub async fn ensure_table(&self, dimension: usize) -> Result<(), StoreError> {
    if self.table_exists().await? {
      let stored = self.stored_dimension().await?;
      if stored != dimension {
        return Err(StoreError::DimensionMismatch {
          collection: self.table_name.clone(),
          stored,
          expected: dimension,
        });
      }
      return Ok(());
    }

    self
      .connection
      .create_empty_table(&self.table_name, document_schema(dimension))
      .execute()
      .await
      .map_err(|e| {
        StoreError::Connection(format!("Failed to create table '{}': {e}", self.table_name))
      })?;

    tracing::info!(table = %self.table_name, dimension, "Created document table");
    Ok(())
  }

  async fn stored_dimension(&self) -> Result<usize, StoreError> {
    let table = self.get_table().await?;
    let schema = table
      .schema()
      .await
      .map_err(|e| StoreError::Connection(format!("Failed to read table schema: {e}")))?;

    embedding_dimension(&schema).ok_or_else(|| {
      StoreError::Connection(format!("Table '{}' has no embedding column", self.table_name))
    })
  }

  /// Append a batch of records in a single commit
  pub async fn add_records(
    &self,
    records: &[DocumentRecord],
    dimension: usize,
  ) -> Result<(), StoreError> {
    let batch = records_to_arrow_batch(records, dimension)?;
    let schema = batch.schema();
    let batch_iter = RecordBatchIterator::new(vec![Ok(batch)], schema);

    let table = self.get_table().await.map_err(|e| StoreError::Write(e.to_string()))?;
    table
      .add(batch_iter)
      .execute()
      .await
      .map_err(|e| StoreError::Write(format!("Failed to store documents: {e}")))?;

    tracing::info!(table = %self.table_name, count = records.len(), "Stored document batch");
    Ok(())
  }

  /// Number of rows, zero when the table does not exist yet
  pub async fn count_rows(&self) -> Result<usize, StoreError> {
    if !self.table_exists().await? {
      return Ok(0);
    }
    let table = self.get_table().await?;
    table
      .count_rows(None)
      .await
      .map_err(|e| StoreError::Connection(format!("Failed to count rows: {e}")))
  }
}
