//! Glyph widths for the built-in Helvetica fonts
//!
//! Widths are in thousandths of the font size, taken from the Adobe core
//! font metrics for the WinAnsi (Windows-1252) encoding.

/// Font face used for a placed row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
  Regular,
  Bold,
}

const PT_TO_MM: f32 = 25.4 / 72.0;
const DEFAULT_WIDTH: u16 = 556;

// ' ' (0x20) through '~' (0x7E)
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
  278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
  1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
  333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
  556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
  278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
  975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
  333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
  611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Characters of Windows-1252 outside Latin-1 (bytes 0x80-0x9F)
const WIN_ANSI_EXTRAS: &[char] = &[
  '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
  '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Whether `c` can be drawn with the built-in fonts
pub fn is_encodable(c: char) -> bool {
  matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRAS.contains(&c)
}

/// Width of one glyph in thousandths of the font size
pub fn glyph_width(c: char, style: FontStyle) -> u16 {
  let table = match style {
    FontStyle::Regular => &HELVETICA,
    FontStyle::Bold => &HELVETICA_BOLD,
  };

  match c {
    ' '..='~' => table[c as usize - 0x20],
    '¡' => 333,
    '¿' => 611,
    '–' => 556,
    '—' => 1000,
    '‘' | '’' | '‚' => 222,
    '“' | '”' | '„' => 333,
    '…' => 1000,
    _ => match base_letter(c) {
      Some(base) => table[base as usize - 0x20],
      None => DEFAULT_WIDTH,
    },
  }
}

/// Accented Latin letters share the width of their base letter
fn base_letter(c: char) -> Option<char> {
  let base = match c {
    'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
    'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'É' | 'È' | 'Ê' | 'Ë' => 'E',
    'í' | 'ì' | 'î' | 'ï' => 'i',
    'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
    'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
    'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
    'ú' | 'ù' | 'û' | 'ü' => 'u',
    'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
    'ñ' => 'n',
    'Ñ' => 'N',
    'ç' => 'c',
    'Ç' => 'C',
    'ý' | 'ÿ' => 'y',
    'Ý' | 'Ÿ' => 'Y',
    'š' => 's',
    'Š' => 'S',
    'ž' => 'z',
    'Ž' => 'Z',
    _ => return None,
  };
  Some(base)
}

/// Rendered width of `text` in millimetres
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f32) -> f32 {
  let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, style))).sum();
  units as f32 / 1000.0 * size_pt * PT_TO_MM
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ascii_widths() {
    assert_eq!(glyph_width(' ', FontStyle::Regular), 278);
    assert_eq!(glyph_width('A', FontStyle::Regular), 667);
    assert_eq!(glyph_width('A', FontStyle::Bold), 722);
    assert_eq!(glyph_width('i', FontStyle::Regular), 222);
    assert_eq!(glyph_width('~', FontStyle::Bold), 584);
  }

  #[test]
  fn test_accented_letters_use_base_width() {
    assert_eq!(glyph_width('é', FontStyle::Regular), glyph_width('e', FontStyle::Regular));
    assert_eq!(glyph_width('Ñ', FontStyle::Bold), glyph_width('N', FontStyle::Bold));
  }

  #[test]
  fn test_encodable_repertoire() {
    for c in ['a', 'ñ', '¿', '€', '—', '“'] {
      assert!(is_encodable(c), "{c} should be encodable");
    }
    for c in ['😀', 'ł', '中', '\u{7}', '\t'] {
      assert!(!is_encodable(c), "{c:?} should not be encodable");
    }
  }

  #[test]
  fn test_text_width_scales_with_size() {
    let at_12 = text_width_mm("Hello", FontStyle::Regular, 12.0);
    let at_24 = text_width_mm("Hello", FontStyle::Regular, 24.0);
    assert!((at_24 - 2.0 * at_12).abs() < 1e-4);
    // 'Hello' is 2278 units
    assert!((at_12 - 2.278 * 12.0 * 25.4 / 72.0).abs() < 1e-4);
  }
}
