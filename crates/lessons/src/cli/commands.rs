//! CLI command implementations

use anyhow::{anyhow, Context, Result};
use colored::*;
use serde::Deserialize;
use std::path::Path;

use crate::config::StoreArgs;
use crate::server::services::document_store::{add_texts, DocumentStore, NewDocument};

/// Methodology passages loaded by `lessons seed` when no file is given
pub const DEFAULT_DOCUMENTS: [&str; 6] = [
  "TB Harden enfatiza la enseñanza comunicativa: aprender hablando en contextos reales.",
  "La pronunciación británica (RP) es fundamental en la metodología TB Harden.",
  "Estructura de clase típica: warm-up, presentation, practice, production, cool-down.",
  "Los errores son oportunidades de aprendizaje, no fallas a corregir inmediatamente.",
  "Uso de material auténtico como periódicos, canciones y videos reales.",
  "Enfoque en la autonomía del estudiante: enseñar a aprender, no solo contenido.",
];

/// YAML seed file: `documents: [{text, metadata?}]`
#[derive(Debug, Deserialize)]
struct SeedFile {
  documents: Vec<NewDocument>,
}

/// Parse seed documents from YAML
pub fn parse_seed_yaml(content: &str) -> Result<Vec<NewDocument>> {
  let seed: SeedFile = serde_yaml::from_str(content).context("Invalid seed file")?;
  if let Some(index) = seed.documents.iter().position(|d| d.text.trim().is_empty()) {
    return Err(anyhow!("Seed document {} has empty text", index + 1));
  }
  Ok(seed.documents)
}

/// Open the configured store with the production embedder
#[cfg(feature = "ml-features")]
pub async fn open_store(args: &StoreArgs) -> Result<Box<dyn DocumentStore>> {
  use crate::server::services::embeddings::OnnxEmbedder;
  use crate::server::services::lancedb::LanceDocumentStore;
  use std::sync::Arc;

  let embedder = Arc::new(OnnxEmbedder::new());
  let store = LanceDocumentStore::open(&args.data_dir(), &args.collection, embedder).await?;
  Ok(Box::new(store))
}

#[cfg(not(feature = "ml-features"))]
pub async fn open_store(_args: &StoreArgs) -> Result<Box<dyn DocumentStore>> {
  Err(anyhow!("The document store needs embeddings; rebuild with the ml-features feature"))
}

/// Load the built-in methodology passages or the documents of a YAML file
pub async fn seed(store: &dyn DocumentStore, file: Option<&Path>) -> Result<()> {
  let documents = match file {
    Some(path) => {
      let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
      parse_seed_yaml(&content)?
    }
    None => DEFAULT_DOCUMENTS.iter().map(|text| NewDocument::new(*text)).collect(),
  };

  if documents.is_empty() {
    println!("No documents to load.");
    return Ok(());
  }

  let ids = store.add_documents(documents).await?;
  println!("{} Loaded {} documents", "✓".green(), ids.len().to_string().cyan());
  Ok(())
}

/// Add plain-text documents
pub async fn add(store: &dyn DocumentStore, texts: Vec<String>) -> Result<()> {
  let ids = add_texts(store, texts).await?;
  for id in &ids {
    println!("{} Added {}", "✓".green(), id.yellow());
  }
  Ok(())
}

/// Print the stored documents most similar to `query`
pub async fn search(store: &dyn DocumentStore, query: &str, limit: usize) -> Result<()> {
  let results = store.search(query, limit).await?;

  if results.is_empty() {
    println!("No matches found for: {}", query.yellow());
    return Ok(());
  }

  for document in results {
    let similarity = format!("{:.3}", document.similarity);
    println!("{} {} {}", similarity.cyan(), document.id.bold(), document.text);
    if !document.metadata.is_empty() {
      let metadata = serde_json::to_string(&document.metadata)?;
      println!("  {} {}", "└─".white().dimmed(), metadata.dimmed());
    }
  }
  Ok(())
}

/// Print the number of stored documents
pub async fn count(store: &dyn DocumentStore) -> Result<()> {
  let total = store.count().await?;
  println!("{} documents", total.to_string().cyan());
  Ok(())
}
