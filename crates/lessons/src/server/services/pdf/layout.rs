//! Page layout for lesson documents
//!
//! Positions are in millimetres measured from the top-left corner of an A4
//! page. Layout is kept separate from PDF emission so it can be inspected in
//! tests.

use super::metrics::{is_encodable, text_width_mm, FontStyle};
use super::RenderError;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;
pub const BOTTOM_MARGIN_MM: f32 = 15.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
/// Horizontal padding inside a row
pub const CELL_PADDING_MM: f32 = 1.0;
pub const ROW_HEIGHT_MM: f32 = 10.0;
pub const LINE_GAP_MM: f32 = 2.0;

pub const TITLE: &str = "Clase de Inglés Generada";
pub const TITLE_SIZE_PT: f32 = 16.0;
pub const BODY_SIZE_PT: f32 = 12.0;

const TAB_WIDTH: usize = 4;

/// A row of text with its position on the page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
  pub text: String,
  /// Left edge of the text
  pub x_mm: f32,
  /// Top edge of the row
  pub top_mm: f32,
  pub style: FontStyle,
  pub size_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
  pub rows: Vec<PlacedText>,
}

/// Unify line endings, expand tabs and reject characters the fonts cannot draw
pub fn normalize(text: &str) -> Result<String, RenderError> {
  let normalized = text
    .replace("\r\n", "\n")
    .replace('\r', "\n")
    .replace('\t', &" ".repeat(TAB_WIDTH));

  for (index, line) in normalized.split('\n').enumerate() {
    if let Some(character) = line.chars().find(|c| !is_encodable(*c)) {
      return Err(RenderError::UnsupportedCharacter { character, line: index + 1 });
    }
  }

  Ok(normalized)
}

/// Greedily pack the words of `line` into rows at most `max_width_mm` wide
///
/// Leading indentation stays on the first row and runs of spaces between
/// words are kept. Spaces at a row break are dropped. A word wider than the
/// limit is placed alone on its own row.
pub fn wrap(line: &str, max_width_mm: f32, style: FontStyle, size_pt: f32) -> Vec<String> {
  let body = line.trim_start_matches(' ');
  let indent = &line[..line.len() - body.len()];
  let body = body.trim_end_matches(' ');
  if body.is_empty() {
    return Vec::new();
  }

  let mut rows = Vec::new();
  let mut current = indent.to_string();
  for (index, (gap, word)) in spaced_words(body).into_iter().enumerate() {
    if index == 0 {
      current.push_str(word);
      continue;
    }

    let candidate = format!("{current}{}{word}", " ".repeat(gap));
    if text_width_mm(&candidate, style, size_pt) <= max_width_mm {
      current = candidate;
    } else {
      rows.push(std::mem::replace(&mut current, word.to_string()));
    }
  }

  rows.push(current);
  rows
}

/// Words of a trimmed line, each with the number of spaces before it
fn spaced_words(body: &str) -> Vec<(usize, &str)> {
  let mut words = Vec::new();
  let mut gap = 0;
  for piece in body.split(' ') {
    if piece.is_empty() {
      gap += 1;
    } else {
      words.push((gap, piece));
      gap = 1;
    }
  }
  words
}

struct Cursor {
  pages: Vec<PageLayout>,
  y: f32,
}

impl Cursor {
  fn new() -> Self {
    Self { pages: vec![PageLayout::default()], y: MARGIN_MM }
  }

  fn place(&mut self, text: String, x_mm: f32, style: FontStyle, size_pt: f32) {
    if self.y + ROW_HEIGHT_MM > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
      self.pages.push(PageLayout::default());
      self.y = MARGIN_MM;
    }
    if let Some(page) = self.pages.last_mut() {
      page.rows.push(PlacedText { text, x_mm, top_mm: self.y, style, size_pt });
    }
    self.y += ROW_HEIGHT_MM;
  }
}

/// Lay out the title and the lesson body across as many pages as needed
pub fn layout(text: &str) -> Result<Vec<PageLayout>, RenderError> {
  let text = normalize(text)?;
  let mut cursor = Cursor::new();

  let title_width = text_width_mm(TITLE, FontStyle::Bold, TITLE_SIZE_PT);
  let title_x = MARGIN_MM + ((CONTENT_WIDTH_MM - title_width) / 2.0).max(0.0);
  cursor.place(TITLE.to_string(), title_x, FontStyle::Bold, TITLE_SIZE_PT);
  cursor.y += ROW_HEIGHT_MM;

  let max_row_width = CONTENT_WIDTH_MM - 2.0 * CELL_PADDING_MM;
  for line in text.split('\n') {
    for row in wrap(line, max_row_width, FontStyle::Regular, BODY_SIZE_PT) {
      cursor.place(row, MARGIN_MM + CELL_PADDING_MM, FontStyle::Regular, BODY_SIZE_PT);
    }
    cursor.y += LINE_GAP_MM;
  }

  Ok(cursor.pages)
}
