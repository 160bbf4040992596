//! REST API types with schemars annotations for schema generation
//!
//! Field names of the lesson endpoints are part of the contract with the
//! browser frontend and stay in Spanish.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Lesson Endpoints
// ================

/// Body of /generar-clase and /descargar-pdf
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateRequest {
  /// Free-text lesson request, or the lesson text to export
  pub mensaje: String,
}

/// Response for /generar-clase
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LessonResponse {
  /// Generated lesson text
  pub clase_generada: String,
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self { error: error.into() }
  }
}

/// Response for /
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HomeResponse {
  pub message: String,
}

// Status Endpoints
// ================

/// Response for /status
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  pub started_at: DateTime<Utc>,
  pub retrieval: RetrievalStatus,
}

/// Availability of the document store
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RetrievalStatus {
  pub available: bool,

  /// Stored documents, when the store could be counted
  pub documents: Option<usize>,

  /// Why retrieval is unavailable
  pub reason: Option<String>,
}

/// Response for /api
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiInfoResponse {
  /// Latest API version
  pub latest: String,

  /// Version information
  pub versions: ApiVersions,

  /// JSON Schemas of the request and response bodies, by type name
  pub schemas: BTreeMap<String, serde_json::Value>,
}

/// API version details
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiVersions {
  /// Latest version
  pub latest: String,

  /// Currently active versions
  pub active: Vec<String>,
}
