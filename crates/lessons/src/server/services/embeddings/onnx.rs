//! Sentence-transformers embedder running on ONNX Runtime
//!
//! The model and tokenizer are fetched from the Hugging Face hub on first
//! use and kept for the lifetime of the process.

use async_trait::async_trait;
use hf_hub::api::tokio::Api;
use ndarray::Array2;
use ort::{session::Session, value::Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tokio::sync::OnceCell;

use super::{mean_pool, normalize_embedding, Embedder, EmbeddingError};

pub const MINILM_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MINILM_DIMENSION: usize = 384;

const TOKENIZER_FILE: &str = "tokenizer.json";
const MODEL_FILE: &str = "onnx/model.onnx";
const MAX_SEQUENCE_LENGTH: usize = 256;

trait TokenEncoding {
  fn get_ids(&self) -> &[u32];
  fn get_attention_mask(&self) -> &[u32];
  fn get_type_ids(&self) -> &[u32];
}

trait SessionInputs {
  fn input_names(&self) -> Vec<String>;
}

#[cfg(not(tarpaulin_include))]
impl TokenEncoding for tokenizers::Encoding {
  fn get_ids(&self) -> &[u32] {
    self.get_ids()
  }
  fn get_attention_mask(&self) -> &[u32] {
    self.get_attention_mask()
  }
  fn get_type_ids(&self) -> &[u32] {
    self.get_type_ids()
  }
}

#[cfg(not(tarpaulin_include))]
impl SessionInputs for Session {
  fn input_names(&self) -> Vec<String> {
    self.inputs.iter().map(|input| input.name.to_string()).collect()
  }
}

struct EmbeddingModel {
  session: Session,
  tokenizer: Tokenizer,
}

struct ModelFiles {
  tokenizer_file: PathBuf,
  model_path: PathBuf,
}

#[cfg(not(tarpaulin_include))] // needs network access and the ONNX runtime
impl EmbeddingModel {
  async fn load() -> Result<Self, EmbeddingError> {
    tracing::info!(model = MINILM_MODEL, "Loading embedding model");

    let files = Self::download_model().await?;
    let tokenizer = Self::load_tokenizer(files.tokenizer_file)?;
    let session = Session::builder()
      .and_then(|builder| builder.commit_from_file(&files.model_path))
      .map_err(|e| EmbeddingError::ModelUnavailable(format!("Failed to load ONNX model: {e}")))?;

    tracing::info!(model = MINILM_MODEL, "Embedding model loaded");
    Ok(Self { session, tokenizer })
  }

  async fn download_model() -> Result<ModelFiles, EmbeddingError> {
    let api = Api::new()
      .map_err(|e| EmbeddingError::ModelUnavailable(format!("HF API initialization failed: {e}")))?;
    let repo = api.model(MINILM_MODEL.to_string());

    let tokenizer_file = repo
      .get(TOKENIZER_FILE)
      .await
      .map_err(|e| EmbeddingError::ModelUnavailable(format!("Failed to download tokenizer: {e}")))?;
    let model_path = repo
      .get(MODEL_FILE)
      .await
      .map_err(|e| {
        EmbeddingError::ModelUnavailable(format!("Failed to download ONNX model: {e}"))
      })?;

    Ok(ModelFiles { tokenizer_file, model_path })
  }

  fn load_tokenizer(path: PathBuf) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer = Tokenizer::from_file(path)
      .map_err(|e| EmbeddingError::ModelUnavailable(format!("Failed to load tokenizer: {e}")))?;

    tokenizer
      .with_truncation(Some(TruncationParams {
        max_length: MAX_SEQUENCE_LENGTH,
        ..Default::default()
      }))
      .map_err(|e| {
        EmbeddingError::ModelUnavailable(format!("Failed to configure tokenizer: {e}"))
      })?;

    Ok(tokenizer)
  }

  fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let encoding = self
      .tokenizer
      .encode(text, true)
      .map_err(|e| EmbeddingError::Inference(format!("Tokenization failed: {e}")))?;

    let input = prepare(&encoding, &self.session)?;
    let outputs = self.session.run(input).map_err(inference_error)?;

    let tensor = outputs
      .get("last_hidden_state")
      .or_else(|| outputs.get("token_embeddings"))
      .ok_or_else(|| EmbeddingError::Inference("model produced no token embeddings".to_string()))?;
    let (shape, data) = tensor.try_extract_tensor::<f32>().map_err(inference_error)?;

    let pooled = mean_pool(&shape[..], data, encoding.get_attention_mask())?;
    Ok(normalize_embedding(pooled))
  }
}

/// Build the session inputs the loaded model asks for
fn prepare(
  tokens: &dyn TokenEncoding,
  session: &dyn SessionInputs,
) -> Result<HashMap<String, Value>, EmbeddingError> {
  let mut input = HashMap::new();
  input.insert("input_ids".to_string(), to_tensor(tokens.get_ids())?);
  input.insert("attention_mask".to_string(), to_tensor(tokens.get_attention_mask())?);

  if session.input_names().iter().any(|name| name == "token_type_ids") {
    input.insert("token_type_ids".to_string(), to_tensor(tokens.get_type_ids())?);
  }

  Ok(input)
}

fn to_tensor(values: &[u32]) -> Result<Value, EmbeddingError> {
  let ids: Vec<i64> = values.iter().map(|&x| x.into()).collect();
  let array = Array2::from_shape_vec((1, values.len()), ids)
    .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
  let tensor: Value = Value::from_array(array).map_err(inference_error)?.into();
  Ok(tensor)
}

fn inference_error(e: ort::Error) -> EmbeddingError {
  EmbeddingError::Inference(e.to_string())
}

/// ONNX-backed [`Embedder`] with lazy model loading
pub struct OnnxEmbedder {
  model: OnceCell<Arc<Mutex<EmbeddingModel>>>,
}

impl OnnxEmbedder {
  pub fn new() -> Self {
    Self { model: OnceCell::new() }
  }

  async fn model(&self) -> Result<Arc<Mutex<EmbeddingModel>>, EmbeddingError> {
    self
      .model
      .get_or_try_init(|| async { EmbeddingModel::load().await.map(|m| Arc::new(Mutex::new(m))) })
      .await
      .cloned()
  }
}

impl Default for OnnxEmbedder {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
  fn model_id(&self) -> &str {
    MINILM_MODEL
  }

  fn dimension(&self) -> usize {
    MINILM_DIMENSION
  }

  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let model = self.model().await?;
    let texts = texts.to_vec();

    tokio::task::spawn_blocking(move || {
      let mut guard = model
        .lock()
        .map_err(|_| EmbeddingError::Inference("embedding model lock poisoned".to_string()))?;
      texts.iter().map(|text| guard.embed(text)).collect()
    })
    .await
    .map_err(|e| EmbeddingError::Inference(format!("embedding task failed: {e}")))?
  }
}
