//! Lessons REST Server
//!
//! Serves lesson generation and PDF export to the browser frontend.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use lessons::config::ServerConfig;
use lessons::server::startup::start_server;

#[derive(Parser)]
#[command(name = "lessons_server")]
#[command(about = "Lessons REST API Server")]
#[command(version)]
struct Args {
  #[command(flatten)]
  config: ServerConfig,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Lance and DataFusion are noisy at info level
  let filter = if args.verbose {
    EnvFilter::new("debug,lance=warn,lance_datafusion=warn,datafusion=warn,hyper=info")
  } else {
    EnvFilter::new(concat!(
      "lessons=info,lessons_server=info,tower_http=info,",
      "lance=error,lance_datafusion=error,datafusion=error,warn"
    ))
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting Lessons REST Server v{}", env!("CARGO_PKG_VERSION"));
  start_server(args.config).await
}
