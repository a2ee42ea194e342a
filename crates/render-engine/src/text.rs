//! Bitmap text for browser chrome and placeholders.
//!
//! Glyphs come from the 8x8 font8x8 tables, scaled so one glyph cell spans
//! `size` logical pixels. Each lit glyph pixel becomes a square in one path.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use tiny_skia::{Path, PathBuilder};

/// Pixels per glyph row and column.
const CELL: usize = 8;
const ELLIPSIS: &str = "...";

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0u8; 8])
}

/// Width of `text` at `size`; every glyph advances one cell.
pub fn measure(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size
}

/// Truncate with an ellipsis so the text fits `max_width`.
pub fn fit(text: &str, size: f64, max_width: f64) -> String {
    if measure(text, size) <= max_width {
        return text.to_string();
    }
    let ellipsis = measure(ELLIPSIS, size);
    if ellipsis > max_width || size <= 0.0 {
        return String::new();
    }
    let keep = ((max_width - ellipsis) / size).floor() as usize;
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str(ELLIPSIS);
    fitted
}

/// Outline of `text` with its top-left corner at `(x, y)`.
pub fn glyph_path(text: &str, x: f64, y: f64, size: f64) -> Option<Path> {
    let px = (size / CELL as f64) as f32;
    let mut builder = PathBuilder::new();
    for (index, ch) in text.chars().enumerate() {
        let origin_x = x as f32 + index as f32 * size as f32;
        for (row_idx, row) in glyph(ch).iter().enumerate() {
            for bit in 0..CELL {
                // leftmost pixel is the least significant bit
                if (row >> bit) & 1 == 1 {
                    if let Some(rect) = tiny_skia::Rect::from_xywh(
                        origin_x + bit as f32 * px,
                        y as f32 + row_idx as f32 * px,
                        px,
                        px,
                    ) {
                        builder.push_rect(rect);
                    }
                }
            }
        }
    }
    builder.finish()
}
