//! Liveness, status and API description handlers

use axum::{extract::State, response::Json};
use schemars::schema_for;
use std::collections::BTreeMap;

use crate::server::state::AppState;
use crate::server::types::{
  ApiInfoResponse, ApiVersions, ErrorResponse, GenerateRequest, HomeResponse, LessonResponse,
  StatusResponse,
};

pub const HOME_MESSAGE: &str = "¡Hola! Tu backend está funcionando 🎉";

/// GET / - Liveness message
pub async fn home() -> Json<HomeResponse> {
  Json(HomeResponse { message: HOME_MESSAGE.to_string() })
}

/// GET /status - Health check with retrieval availability
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
  Json(StatusResponse {
    status: "ok".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    started_at: state.started_at,
    retrieval: state.retrieval.status().await,
  })
}

/// GET /api - API version and body schemas
pub async fn api_info() -> Json<ApiInfoResponse> {
  let version = env!("CARGO_PKG_VERSION");

  let mut schemas = BTreeMap::new();
  schemas.insert("GenerateRequest".to_string(), to_json(schema_for!(GenerateRequest)));
  schemas.insert("LessonResponse".to_string(), to_json(schema_for!(LessonResponse)));
  schemas.insert("ErrorResponse".to_string(), to_json(schema_for!(ErrorResponse)));
  schemas.insert("StatusResponse".to_string(), to_json(schema_for!(StatusResponse)));

  Json(ApiInfoResponse {
    latest: version.to_string(),
    versions: ApiVersions { latest: version.to_string(), active: vec![version.to_string()] },
    schemas,
  })
}

fn to_json(schema: schemars::schema::RootSchema) -> serde_json::Value {
  serde_json::to_value(schema).unwrap_or_default()
}
