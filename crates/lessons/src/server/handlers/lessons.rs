//! Lesson generation handler

use axum::{
  extract::{rejection::JsonRejection, State},
  http::StatusCode,
  response::{IntoResponse, Json, Response},
  Extension,
};

use super::error_response;
use crate::server::middleware::RequestContext;
use crate::server::services::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::server::state::AppState;
use crate::server::types::{GenerateRequest, LessonResponse};

/// POST /generar-clase - Generate a lesson grounded in retrieved methodology passages
pub async fn generate_lesson(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
  let request = match payload {
    Ok(Json(request)) => request,
    Err(rejection) => {
      tracing::warn!(request_id = %context.request_id, "Rejected lesson request: {rejection}");
      return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
    }
  };

  let passages = state.retrieve_context(&request.mensaje).await;
  let prompt = build_prompt(&request.mensaje, &passages);

  match state.completion.complete(SYSTEM_INSTRUCTION, &prompt).await {
    Ok(clase_generada) => {
      tracing::info!(
        request_id = %context.request_id,
        passages = passages.len(),
        length = clase_generada.len(),
        "Generated lesson"
      );
      Json(LessonResponse { clase_generada }).into_response()
    }
    Err(e) => {
      tracing::error!(request_id = %context.request_id, "Lesson generation failed: {e}");
      error_response(StatusCode::BAD_GATEWAY, format!("No se pudo generar la clase: {e}"))
    }
  }
}
