//! HTTP handlers

use axum::{
  http::StatusCode,
  response::{IntoResponse, Json, Response},
};

use crate::server::types::ErrorResponse;

pub mod lessons;
pub mod pdf;
pub mod status;

/// JSON `{"error": ...}` body with the given status
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
  (status, Json(ErrorResponse::new(message))).into_response()
}
