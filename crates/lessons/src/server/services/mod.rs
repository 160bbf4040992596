//! Services used by the HTTP handlers and the CLI

pub mod completion;
pub mod document_store;
pub mod embeddings;
pub mod lancedb;
pub mod pdf;
pub mod prompt;
