//! Request context middleware
//!
//! Every request gets a [`RequestContext`] with a unique id, available to
//! handlers through request extensions, and is logged on start and completion.

use axum::{
  extract::Request,
  http::{Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Request metadata shared with handlers
#[derive(Debug, Clone)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri }
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context = RequestContext::new(request.method().clone(), request.uri().clone());
  let user_agent = request
    .headers()
    .get("user-agent")
    .and_then(|v| v.to_str().ok())
    .unwrap_or("none")
    .to_string();

  let start_time = Instant::now();
  tracing::info!(
    request_id = %context.request_id,
    method = %context.method,
    path = context.uri.path(),
    user_agent = %user_agent,
    "Request started"
  );

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  tracing::info!(
    request_id = %context.request_id,
    method = %context.method,
    path = context.uri.path(),
    status = response.status().as_u16(),
    duration_ms,
    "Request completed"
  );

  response
}
