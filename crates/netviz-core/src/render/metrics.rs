//! Text measurement for the base-14 Helvetica font.
//!
//! Both the PDF backend and the recording surface measure text the same way,
//! so layout computed in tests matches layout written to disk.

use super::TextExtents;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Height of capitals above the baseline, in em.
const CAP_HEIGHT: f64 = 0.718;
/// Depth of descenders below the baseline, in em.
const DESCENT: f64 = 0.207;

fn advance(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => 556,
    }
}

fn has_descender(c: char) -> bool {
    matches!(c, 'g' | 'j' | 'p' | 'q' | 'y' | ',' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '_' | '@')
}

/// Measures `text` set in Helvetica at `font_size` points.
pub fn measure_text(text: &str, font_size: f64) -> TextExtents {
    if text.is_empty() {
        return TextExtents::default();
    }
    let width: u32 = text.chars().map(|c| advance(c) as u32).sum();
    let depth = if text.chars().any(has_descender) {
        DESCENT
    } else {
        0.0
    };
    TextExtents {
        width: width as f64 * font_size / 1000.0,
        height: (CAP_HEIGHT + depth) * font_size,
    }
}
