//! Lesson PDF export
//!
//! Lessons are laid out on A4 pages with the built-in Helvetica fonts,
//! written to a uniquely named file and streamed back to the client. The file
//! is removed once the response body is dropped.

pub mod layout;
pub mod metrics;
mod render;

pub use layout::{layout, normalize, wrap, PageLayout, PlacedText};
pub use render::render_pdf;

use axum::body::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("character {character:?} on line {line} cannot be represented in the PDF font")]
  UnsupportedCharacter { character: char, line: usize },

  #[error("failed to write PDF file: {0}")]
  Io(#[from] io::Error),

  #[error("failed to build PDF: {0}")]
  Pdf(String),
}

/// A rendered PDF on disk, deleted when dropped
#[derive(Debug)]
pub struct PdfArtifact {
  filename: String,
  path: TempPath,
}

impl PdfArtifact {
  /// `clase_ingles_<uuid>.pdf`
  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Open the file for streaming; the stream takes over deleting it
  pub async fn into_stream(self) -> io::Result<TempFileStream> {
    let file = tokio::fs::File::open(&self.path).await?;
    Ok(TempFileStream { inner: ReaderStream::new(file), _path: self.path })
  }
}

/// File contents as a byte stream that removes the file when dropped
pub struct TempFileStream {
  inner: ReaderStream<tokio::fs::File>,
  // Dropped after `inner`, so the handle is closed before removal
  _path: TempPath,
}

impl Stream for TempFileStream {
  type Item = io::Result<Bytes>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    Pin::new(&mut self.inner).poll_next(cx)
  }
}

/// Render `text` and write it to a fresh file in `dir`
pub fn write_pdf_artifact(text: &str, dir: &Path) -> Result<PdfArtifact, RenderError> {
  let bytes = render_pdf(text)?;

  std::fs::create_dir_all(dir)?;
  let filename = format!("clase_ingles_{}.pdf", Uuid::new_v4().simple());
  let path: PathBuf = dir.join(&filename);
  std::fs::write(&path, &bytes)?;

  tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote lesson PDF");
  Ok(PdfArtifact { filename, path: TempPath::from_path(path) })
}
