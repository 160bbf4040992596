//! REST server startup and configuration

use anyhow::Result;
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{ServerConfig, StoreArgs};
use crate::server::routing::create_router;
use crate::server::services::completion::OpenAiClient;
use crate::server::state::{AppState, Retrieval};

/// Start the REST server and run until Ctrl-C or SIGTERM
pub async fn start_server(config: ServerConfig) -> Result<()> {
  config.validate()?;

  let completion = Arc::new(OpenAiClient::new(
    config.api_key()?,
    config.openai_base_url.as_str(),
    config.model.as_str(),
  ));
  let model = completion.model().to_string();
  let retrieval = open_retrieval(&config.store).await?;
  let state = AppState::new(retrieval, completion, config.pdf_dir(), config.top_k);

  tracing::info!(
    model = %model,
    top_k = config.top_k,
    pdf_dir = %state.pdf_dir.display(),
    "Starting lessons REST server on {}",
    config.bind
  );

  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(config.bind).await?;
  tracing::info!("Server listening on {}", config.bind);

  match serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
    Ok(()) => {
      tracing::info!("Server shutdown gracefully");
      Ok(())
    }
    Err(e) => {
      tracing::error!("Server error: {e}");
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}

/// Open the document store, degrading to unavailable retrieval on failure
///
/// A collection built for another embedding size is a configuration error
/// and aborts startup.
#[cfg(feature = "ml-features")]
async fn open_retrieval(store: &StoreArgs) -> Result<Retrieval> {
  use crate::server::services::document_store::StoreError;
  use crate::server::services::embeddings::OnnxEmbedder;
  use crate::server::services::lancedb::LanceDocumentStore;

  let embedder = Arc::new(OnnxEmbedder::new());
  match LanceDocumentStore::open(&store.data_dir(), &store.collection, embedder).await {
    Ok(documents) => {
      tracing::info!(collection = documents.collection(), "Retrieval enabled");
      Ok(Retrieval::Available(Arc::new(documents)))
    }
    Err(e @ StoreError::DimensionMismatch { .. }) => Err(e.into()),
    Err(e) => {
      tracing::warn!("Document store unavailable, lessons will be generated without context: {e}");
      Ok(Retrieval::unavailable(e.to_string()))
    }
  }
}

#[cfg(not(feature = "ml-features"))]
async fn open_retrieval(_store: &StoreArgs) -> Result<Retrieval> {
  tracing::warn!("Built without ml-features, lessons will be generated without context");
  Ok(Retrieval::unavailable("embedding support not compiled in (ml-features disabled)"))
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!("Failed to install Ctrl-C handler: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(e) => {
        tracing::error!("Failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("Shutdown signal received");
}
