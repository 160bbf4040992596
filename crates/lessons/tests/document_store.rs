//! LanceDB document store behaviour against a scratch directory

mod common;

use common::{FlakyEmbedder, LetterEmbedder, SizedEmbedder, LETTER_DIMENSION};
use lessons::server::services::document_store::{
  add_texts, DocumentStore, MetadataValue, NewDocument, StoreError,
};
use lessons::server::services::embeddings::Embedder;
use lessons::server::services::lancedb::LanceDocumentStore;
use std::sync::Arc;
use tempfile::TempDir;

const COLLECTION: &str = "tbl_activities";

async fn open(
  dir: &TempDir,
  embedder: Arc<dyn Embedder>,
) -> Result<LanceDocumentStore, StoreError> {
  LanceDocumentStore::open(dir.path(), COLLECTION, embedder).await
}

fn texts(items: &[&str]) -> Vec<String> {
  items.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_query_ranks_closest_document_first() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();

  let ids = add_texts(&store, texts(&["A", "B", "C"])).await.unwrap();
  assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2"]);

  let results = store.search("A", 2).await.unwrap();
  assert!(!results.is_empty() && results.len() <= 2);
  assert_eq!(results[0].text, "A");
  assert!(results[0].similarity >= results[results.len() - 1].similarity);
  assert!((results[0].similarity - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_search_on_empty_store_returns_nothing() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();

  assert_eq!(store.collection(), COLLECTION);
  assert_eq!(store.count().await.unwrap(), 0);
  assert!(store.search("anything", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_returns_at_most_k_ranked_results() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();
  add_texts(&store, texts(&["warm up", "presentation", "practice", "production", "cool down"]))
    .await
    .unwrap();

  let results = store.search("practice production", 3).await.unwrap();
  assert_eq!(results.len(), 3);
  for pair in results.windows(2) {
    assert!(pair[0].similarity >= pair[1].similarity);
  }

  assert_eq!(store.search("practice", 10).await.unwrap().len(), 5);
  assert!(store.search("practice", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_metadata_is_returned_with_results() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();

  let mut document = NewDocument::new("songs and videos");
  document.metadata.insert("nivel".to_string(), MetadataValue::Text("A2".to_string()));
  store.add_documents(vec![document]).await.unwrap();

  let results = store.search("songs", 1).await.unwrap();
  assert_eq!(results[0].metadata["nivel"], MetadataValue::Text("A2".to_string()));
}

#[tokio::test]
async fn test_failed_batch_leaves_store_unchanged() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(FlakyEmbedder)).await.unwrap();
  add_texts(&store, texts(&["first"])).await.unwrap();

  let result = add_texts(&store, texts(&["second", "this will fail"])).await;
  assert!(matches!(result, Err(StoreError::Embedding(_))));
  assert_eq!(store.count().await.unwrap(), 1);

  // Ids continue from the last successful batch
  let ids = add_texts(&store, texts(&["third"])).await.unwrap();
  assert_eq!(ids, vec!["doc_1"]);
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();
  add_texts(&store, texts(&["A", "B"])).await.unwrap();

  // A plain file where the table keeps its data files makes the append fail
  let data_dir = dir.path().join(format!("{COLLECTION}.lance")).join("data");
  let parked = dir.path().join("parked-data");
  std::fs::rename(&data_dir, &parked).unwrap();
  std::fs::write(&data_dir, b"").unwrap();

  let result = add_texts(&store, texts(&["C"])).await;
  assert!(matches!(result, Err(StoreError::Write(_))), "unexpected result {result:?}");

  std::fs::remove_file(&data_dir).unwrap();
  std::fs::rename(&parked, &data_dir).unwrap();

  assert_eq!(store.count().await.unwrap(), 2);
  let ids = add_texts(&store, texts(&["C"])).await.unwrap();
  assert_eq!(ids, vec!["doc_2"]);
  assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
  let dir = TempDir::new().unwrap();
  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();

  assert!(store.add_documents(Vec::new()).await.unwrap().is_empty());
  assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_documents_persist_across_reopen() {
  let dir = TempDir::new().unwrap();
  {
    let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();
    add_texts(&store, texts(&["A", "B", "C"])).await.unwrap();
  }

  let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();
  assert_eq!(store.count().await.unwrap(), 3);
  assert_eq!(store.search("B", 1).await.unwrap()[0].text, "B");

  let ids = add_texts(&store, texts(&["D"])).await.unwrap();
  assert_eq!(ids, vec!["doc_3"]);
}

#[tokio::test]
async fn test_reopen_with_other_dimension_fails() {
  let dir = TempDir::new().unwrap();
  {
    let store = open(&dir, Arc::new(LetterEmbedder)).await.unwrap();
    add_texts(&store, texts(&["A"])).await.unwrap();
  }

  match open(&dir, Arc::new(SizedEmbedder(8))).await {
    Err(StoreError::DimensionMismatch { collection, stored, expected }) => {
      assert_eq!(collection, COLLECTION);
      assert_eq!(stored, LETTER_DIMENSION);
      assert_eq!(expected, 8);
    }
    Err(other) => panic!("expected dimension mismatch, got {other}"),
    Ok(_) => panic!("expected dimension mismatch, store opened"),
  }
}

#[tokio::test]
async fn test_concurrent_batches_get_distinct_ids() {
  let dir = TempDir::new().unwrap();
  let store = Arc::new(open(&dir, Arc::new(LetterEmbedder)).await.unwrap());

  let handles: Vec<_> = (0..4)
    .map(|i| {
      let store = store.clone();
      let batch = vec![format!("batch {i} a"), format!("batch {i} b")];
      tokio::spawn(async move { add_texts(store.as_ref(), batch).await })
    })
    .collect();

  let mut ids = Vec::new();
  for handle in handles {
    ids.extend(handle.await.unwrap().unwrap());
  }
  ids.sort();
  ids.dedup();

  assert_eq!(ids.len(), 8);
  assert_eq!(store.count().await.unwrap(), 8);
}
