//! Configuration for the lessons server and CLI
//!
//! Every option can be given on the command line or through the environment.
//! The completion API key is required and validated before anything is bound
//! or opened.

use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_COLLECTION: &str = "tbl_activities";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Missing completion API key: set OPENAI_API_KEY or pass --openai-api-key")]
  MissingApiKey,

  #[error("--top-k must be at least 1")]
  ZeroTopK,
}

/// Location of the persistent document store
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
  /// Directory holding the LanceDB document store
  #[arg(long, env = "LESSONS_DATA_DIR")]
  pub data_dir: Option<PathBuf>,

  /// Name of the document collection (LanceDB table)
  #[arg(long, env = "LESSONS_COLLECTION", default_value = DEFAULT_COLLECTION)]
  pub collection: String,
}

impl StoreArgs {
  /// Configured data directory, or `~/.lessons/lancedb`
  pub fn data_dir(&self) -> PathBuf {
    self.data_dir.clone().unwrap_or_else(default_data_dir)
  }
}

/// Server configuration
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
  /// Server bind address
  #[arg(long, env = "LESSONS_BIND", default_value = "0.0.0.0:8000")]
  pub bind: SocketAddr,

  /// API key for the chat completion provider
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
  pub openai_api_key: Option<String>,

  /// Base URL of the OpenAI-compatible completion API
  #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
  pub openai_base_url: String,

  /// Completion model identifier
  #[arg(long, env = "LESSONS_MODEL", default_value = DEFAULT_MODEL)]
  pub model: String,

  /// Number of passages retrieved per lesson request
  #[arg(long, env = "LESSONS_TOP_K", default_value_t = DEFAULT_TOP_K)]
  pub top_k: usize,

  /// Directory for temporary PDF files
  #[arg(long, env = "LESSONS_PDF_DIR")]
  pub pdf_dir: Option<PathBuf>,

  #[command(flatten)]
  pub store: StoreArgs,
}

impl ServerConfig {
  /// Check the configuration before any resource is acquired
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.api_key()?;
    if self.top_k == 0 {
      return Err(ConfigError::ZeroTopK);
    }
    Ok(())
  }

  /// The provider API key, rejecting absent or blank values
  pub fn api_key(&self) -> Result<&str, ConfigError> {
    match self.openai_api_key.as_deref().map(str::trim) {
      Some(key) if !key.is_empty() => Ok(key),
      _ => Err(ConfigError::MissingApiKey),
    }
  }

  /// Configured PDF directory, or the system temp dir
  pub fn pdf_dir(&self) -> PathBuf {
    self.pdf_dir.clone().unwrap_or_else(std::env::temp_dir)
  }
}

fn default_data_dir() -> PathBuf {
  dirs::home_dir()
    .unwrap_or_else(|| std::path::Path::new("/tmp").to_path_buf())
    .join(".lessons")
    .join("lancedb")
}
