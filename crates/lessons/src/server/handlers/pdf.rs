//! PDF export handler

use axum::{
  body::Body,
  extract::{rejection::JsonRejection, State},
  http::{header, StatusCode},
  response::{IntoResponse, Json, Response},
  Extension,
};

use super::error_response;
use crate::server::middleware::RequestContext;
use crate::server::services::pdf::{write_pdf_artifact, RenderError};
use crate::server::state::AppState;
use crate::server::types::GenerateRequest;

/// POST /descargar-pdf - Render lesson text and stream it back as a PDF attachment
pub async fn download_pdf(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
  let request = match payload {
    Ok(Json(request)) => request,
    Err(rejection) => {
      tracing::warn!(request_id = %context.request_id, "Rejected PDF request: {rejection}");
      return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
    }
  };

  let dir = state.pdf_dir.clone();
  let rendered =
    tokio::task::spawn_blocking(move || write_pdf_artifact(&request.mensaje, &dir)).await;

  let artifact = match rendered {
    Ok(Ok(artifact)) => artifact,
    Ok(Err(e @ RenderError::UnsupportedCharacter { .. })) => {
      tracing::warn!(request_id = %context.request_id, "Cannot render lesson: {e}");
      return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }
    Ok(Err(e)) => {
      tracing::error!(request_id = %context.request_id, "PDF export failed: {e}");
      return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    Err(e) => {
      tracing::error!(request_id = %context.request_id, "PDF rendering task failed: {e}");
      return error_response(StatusCode::INTERNAL_SERVER_ERROR, "PDF rendering task failed");
    }
  };

  let disposition = format!("attachment; filename=\"{}\"", artifact.filename());
  tracing::info!(
    request_id = %context.request_id,
    file = artifact.filename(),
    "Streaming lesson PDF"
  );

  match artifact.into_stream().await {
    Ok(stream) => (
      [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
      ],
      Body::from_stream(stream),
    )
      .into_response(),
    Err(e) => {
      tracing::error!(request_id = %context.request_id, "Failed to open rendered PDF: {e}");
      error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("failed to open PDF file: {e}"))
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::server::handlers::test_support::{json_body, post_json, send, state};
  use crate::server::services::completion::MockCompletionClient;
  use crate::server::state::Retrieval;
  use axum::body::to_bytes;
  use axum::http::{header, StatusCode};
  use tempfile::TempDir;

  fn pdf_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
  }

  #[tokio::test]
  async fn test_streams_pdf_attachment_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let mut app = state(Retrieval::unavailable("test"), MockCompletionClient::new());
    app.pdf_dir = dir.path().to_path_buf();

    let request = post_json("/descargar-pdf", r#"{"mensaje": "Lesson 1\nGreetings"}"#);
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"clase_ingles_"));
    assert!(disposition.ends_with(".pdf\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(pdf_files(&dir), 0);
  }

  #[tokio::test]
  async fn test_unsupported_characters_rejected() {
    let dir = TempDir::new().unwrap();
    let mut app = state(Retrieval::unavailable("test"), MockCompletionClient::new());
    app.pdf_dir = dir.path().to_path_buf();

    let response = send(app, post_json("/descargar-pdf", r#"{"mensaje": "Great job 🎉"}"#)).await;
    let (status, body) = json_body(response).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("line 1"));
    assert_eq!(pdf_files(&dir), 0);
  }

  #[tokio::test]
  async fn test_missing_message_rejected() {
    let app = state(Retrieval::unavailable("test"), MockCompletionClient::new());
    let (status, body) = json_body(send(app, post_json("/descargar-pdf", "{}")).await).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
  }
}
