//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{lessons, pdf, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Liveness, status and API description
    .route("/", get(status::home))
    .route("/status", get(status::status))
    .route("/api", get(status::api_info))
    // Lesson endpoints
    .route("/generar-clase", post(lessons::generate_lesson))
    .route("/descargar-pdf", post(pdf::download_pdf))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
