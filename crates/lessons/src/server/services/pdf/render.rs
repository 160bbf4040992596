//! PDF emission with printpdf

use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;

use super::layout::{layout, PlacedText, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, ROW_HEIGHT_MM, TITLE};
use super::metrics::FontStyle;
use super::RenderError;

const LAYER_NAME: &str = "Layer 1";
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Render lesson text as a complete PDF document
pub fn render_pdf(text: &str) -> Result<Vec<u8>, RenderError> {
  let pages = layout(text)?;

  let (doc, first_page, first_layer) =
    PdfDocument::new(TITLE, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
  let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
  let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

  for (index, page) in pages.iter().enumerate() {
    let (page_index, layer_index) = if index == 0 {
      (first_page, first_layer)
    } else {
      doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
    };
    let layer = doc.get_page(page_index).get_layer(layer_index);

    for row in &page.rows {
      let font = match row.style {
        FontStyle::Regular => &regular,
        FontStyle::Bold => &bold,
      };
      layer.use_text(row.text.as_str(), row.size_pt, Mm(row.x_mm), Mm(baseline_mm(row)), font);
    }
  }

  let mut writer = BufWriter::new(Vec::new());
  doc.save(&mut writer).map_err(pdf_error)?;
  writer.into_inner().map_err(|e| RenderError::Io(e.into_error()))
}

/// Baseline of a row, measured from the bottom of the page
///
/// Text is vertically centred in its row.
fn baseline_mm(row: &PlacedText) -> f32 {
  let font_mm = row.size_pt * PT_TO_MM;
  PAGE_HEIGHT_MM - (row.top_mm + ROW_HEIGHT_MM / 2.0 + 0.3 * font_mm)
}

fn pdf_error(e: printpdf::Error) -> RenderError {
  RenderError::Pdf(e.to_string())
}
