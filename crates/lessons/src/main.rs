use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use lessons::cli::commands;
use lessons::config::StoreArgs;

#[derive(Parser)]
#[command(name = "lessons")]
#[command(about = concat!(
  "Lessons - methodology document store management\n",
  "Seed, inspect and query the passages used to ground generated lessons"
))]
#[command(version)]
struct Cli {
  #[command(flatten)]
  store: StoreArgs,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load the built-in methodology passages, or documents from a YAML file
  Seed {
    /// YAML file with `documents: [{text, metadata}]`
    #[arg(short, long)]
    file: Option<PathBuf>,
  },
  /// Add plain-text documents
  Add {
    /// Document texts
    #[arg(required = true)]
    texts: Vec<String>,
  },
  /// Show the stored documents most similar to a query
  Search {
    /// Query text
    query: String,
    /// Maximum number of results
    #[arg(short, long, default_value_t = lessons::config::DEFAULT_TOP_K)]
    limit: usize,
  },
  /// Show the number of stored documents
  Count,
}

async fn handle(cli: Cli) -> Result<()> {
  let store = commands::open_store(&cli.store).await?;
  let store = &*store;

  match cli.command {
    Command::Seed { file } => commands::seed(store, file.as_deref()).await,
    Command::Add { texts } => commands::add(store, texts).await,
    Command::Search { query, limit } => commands::search(store, &query, limit).await,
    Command::Count => commands::count(store).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("info,lance=warn,lance_datafusion=warn,datafusion=warn")
  } else {
    EnvFilter::new("lessons=warn,lance=error,lance_datafusion=error,datafusion=error,error")
  };
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  handle(cli).await
}
