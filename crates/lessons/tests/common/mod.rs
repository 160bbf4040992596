//! Deterministic embedders for store tests

#![allow(dead_code)]

use async_trait::async_trait;
use lessons::server::services::embeddings::{Embedder, EmbeddingError};

/// Letter-frequency vectors: texts sharing letters land close together
pub struct LetterEmbedder;

pub const LETTER_DIMENSION: usize = 27;

#[async_trait]
impl Embedder for LetterEmbedder {
  fn model_id(&self) -> &str {
    "test/letters"
  }

  fn dimension(&self) -> usize {
    LETTER_DIMENSION
  }

  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    Ok(texts.iter().map(|t| letter_vector(t)).collect())
  }
}

fn letter_vector(text: &str) -> Vec<f32> {
  let mut vector = vec![0.0f32; LETTER_DIMENSION];
  for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
    vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
  }
  // Keeps letterless texts away from the zero vector
  vector[LETTER_DIMENSION - 1] = 0.1;

  let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
  vector.iter().map(|x| x / norm).collect()
}

/// Fails whenever a batch contains a text with `fail` in it
pub struct FlakyEmbedder;

#[async_trait]
impl Embedder for FlakyEmbedder {
  fn model_id(&self) -> &str {
    "test/flaky"
  }

  fn dimension(&self) -> usize {
    LETTER_DIMENSION
  }

  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.iter().any(|t| t.contains("fail")) {
      return Err(EmbeddingError::Inference("simulated failure".to_string()));
    }
    LetterEmbedder.embed(texts).await
  }
}

/// Produces vectors of a configurable size
pub struct SizedEmbedder(pub usize);

#[async_trait]
impl Embedder for SizedEmbedder {
  fn model_id(&self) -> &str {
    "test/sized"
  }

  fn dimension(&self) -> usize {
    self.0
  }

  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    Ok(texts.iter().map(|_| vec![1.0 / (self.0 as f32).sqrt(); self.0]).collect())
  }
}
