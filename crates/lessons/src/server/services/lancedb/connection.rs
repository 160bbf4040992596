//! Database connection management for LanceDB

use lancedb::{connect, Connection};
use std::path::Path;

use crate::server::services::document_store::StoreError;

/// Create a LanceDB connection, creating the data directory if needed
pub async fn create_connection(data_dir: &Path) -> Result<Connection, StoreError> {
  ensure_data_directory_exists(data_dir)?;

  connect(&data_dir.to_string_lossy())
    .execute()
    .await
    .map_err(|e| StoreError::Connection(format!("Failed to connect to LanceDB: {e}")))
}

fn ensure_data_directory_exists(data_dir: &Path) -> Result<(), StoreError> {
  if !data_dir.exists() {
    std::fs::create_dir_all(data_dir)
      .map_err(|e| StoreError::Connection(format!("Failed to create data directory: {e}")))?;
  }
  Ok(())
}
