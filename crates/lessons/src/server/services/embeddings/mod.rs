//! Text embeddings for the document store
//!
//! The store only depends on the [`Embedder`] trait. The production embedder
//! runs a sentence-transformers ONNX model and is compiled in with the
//! `ml-features` feature.

#[cfg(feature = "ml-features")]
mod onnx;

#[cfg(feature = "ml-features")]
pub use onnx::{OnnxEmbedder, MINILM_DIMENSION, MINILM_MODEL};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
  #[error("Embedding model unavailable: {0}")]
  ModelUnavailable(String),

  #[error("Embedding inference failed: {0}")]
  Inference(String),

  #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
  DimensionMismatch { expected: usize, actual: usize },
}

/// Produces fixed-length vectors from text
#[async_trait]
pub trait Embedder: Send + Sync {
  /// Identifier of the underlying model
  fn model_id(&self) -> &str;

  /// Length of every vector this embedder produces
  fn dimension(&self) -> usize;

  /// Embed each text, preserving input order
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Embed `texts` and verify every vector has the embedder's dimension
pub async fn embed_checked(
  embedder: &dyn Embedder,
  texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
  let embeddings = embedder.embed(texts).await?;

  if embeddings.len() != texts.len() {
    return Err(EmbeddingError::Inference(format!(
      "expected {} embeddings, model returned {}",
      texts.len(),
      embeddings.len()
    )));
  }

  let expected = embedder.dimension();
  if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
    return Err(EmbeddingError::DimensionMismatch { expected, actual: bad.len() });
  }

  Ok(embeddings)
}

/// Mean pooling over the sequence dimension, counting only attended tokens
///
/// `shape` is `[batch, seq_len, hidden]` with a batch of one.
pub fn mean_pool(
  shape: &[i64],
  data: &[f32],
  attention_mask: &[u32],
) -> Result<Vec<f32>, EmbeddingError> {
  if shape.len() != 3 {
    return Err(EmbeddingError::Inference(format!("unexpected output rank {}", shape.len())));
  }

  let seq_length = shape[1] as usize;
  let hidden_size = shape[2] as usize;
  if data.len() < seq_length * hidden_size {
    return Err(EmbeddingError::Inference(format!(
      "output holds {} values, shape needs {}",
      data.len(),
      seq_length * hidden_size
    )));
  }

  let mut pooled = vec![0.0f32; hidden_size];
  let mut attended = 0usize;

  for token_idx in 0..seq_length {
    if attention_mask.get(token_idx).copied().unwrap_or(1) == 0 {
      continue;
    }
    attended += 1;
    let start = token_idx * hidden_size;
    for (i, &value) in data[start..start + hidden_size].iter().enumerate() {
      pooled[i] += value;
    }
  }

  let divisor = attended.max(1) as f32;
  for value in pooled.iter_mut() {
    *value /= divisor;
  }

  Ok(pooled)
}

/// Normalize to unit length so cosine distance is well defined
pub fn normalize_embedding(mut embedding: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude < f32::EPSILON {
    tracing::warn!("Zero-magnitude embedding detected - returning unchanged");
    return embedding;
  }

  for value in embedding.iter_mut() {
    *value /= magnitude;
  }

  embedding
}
